//! SVG pie chart of category shares

use spendmap_config::ChartConfig;
use spendmap_core::ChartData;
use std::f64::consts::PI;
use std::io;
use std::path::Path;
use svg::{
    node::element::{path::Data, Circle, Group, Path as SvgPath, Rectangle, Text},
    node, Document,
};

/// Slices smaller than this many percent get no label
const MIN_LABELED_PERCENT: f64 = 3.0;
const TITLE_HEIGHT: f64 = 40.0;
const LEGEND_ROW: f64 = 22.0;

pub struct PieChart<'d> {
    data: &'d ChartData,
    size: f64,
    show_legend: bool,
}

impl<'d> PieChart<'d> {
    pub fn new(data: &'d ChartData, config: &ChartConfig) -> Self {
        Self {
            data,
            size: config.size as f64,
            show_legend: config.show_legend,
        }
    }

    fn radius(&self) -> f64 {
        self.size / 2.0 - 10.0
    }

    fn center(&self) -> (f64, f64) {
        (self.size / 2.0, TITLE_HEIGHT + self.size / 2.0)
    }

    fn point(&self, angle: f64, radius: f64) -> (f64, f64) {
        let (cx, cy) = self.center();
        (cx + radius * angle.cos(), cy + radius * angle.sin())
    }

    fn slices(&self) -> Group {
        let total = self.data.total();
        let (cx, cy) = self.center();
        let r = self.radius();
        let mut group = Group::new().set("stroke", "white").set("stroke-width", 1);

        let points: Vec<_> = self.data.data_points.iter().filter(|p| p.value > 0.0).collect();
        if total <= 0.0 || points.is_empty() {
            return group.add(
                Circle::new()
                    .set("cx", cx)
                    .set("cy", cy)
                    .set("r", r)
                    .set("fill", "#E7E9ED"),
            );
        }
        if points.len() == 1 {
            return group.add(
                Circle::new()
                    .set("cx", cx)
                    .set("cy", cy)
                    .set("r", r)
                    .set("fill", points[0].color.as_str()),
            );
        }

        // Clockwise from twelve o'clock
        let mut angle = -PI / 2.0;
        for point in points {
            let sweep = point.value / total * 2.0 * PI;
            let end = angle + sweep;
            let (x1, y1) = self.point(angle, r);
            let (x2, y2) = self.point(end, r);
            let large_arc = if sweep > PI { 1.0 } else { 0.0 };

            let data = Data::new()
                .move_to((cx, cy))
                .line_to((x1, y1))
                .elliptical_arc_to((r, r, 0.0, large_arc, 1.0, x2, y2))
                .close();
            group = group.add(
                SvgPath::new()
                    .set("fill", point.color.as_str())
                    .set("d", data),
            );
            angle = end;
        }
        group
    }

    fn labels(&self) -> Group {
        let total = self.data.total();
        let mut group = Group::new()
            .set("font-family", "sans-serif")
            .set("font-size", 13)
            .set("text-anchor", "middle")
            .set("fill", "white");
        if total <= 0.0 {
            return group;
        }

        let mut angle = -PI / 2.0;
        for point in self.data.data_points.iter().filter(|p| p.value > 0.0) {
            let sweep = point.value / total * 2.0 * PI;
            if point.percentage >= MIN_LABELED_PERCENT {
                let (x, y) = self.point(angle + sweep / 2.0, self.radius() * 0.65);
                group = group.add(
                    Text::new()
                        .set("x", x)
                        .set("y", y)
                        .set("dominant-baseline", "middle")
                        .add(node::Text::new(format!("{:.1}%", point.percentage))),
                );
            }
            angle += sweep;
        }
        group
    }

    fn legend(&self) -> Group {
        let x = self.size + 10.0;
        let mut group = Group::new()
            .set("font-family", "sans-serif")
            .set("font-size", 13);
        for (i, point) in self.data.data_points.iter().enumerate() {
            let y = TITLE_HEIGHT + 10.0 + i as f64 * LEGEND_ROW;
            group = group
                .add(
                    Rectangle::new()
                        .set("x", x)
                        .set("y", y)
                        .set("width", 14)
                        .set("height", 14)
                        .set("fill", point.color.as_str()),
                )
                .add(
                    Text::new()
                        .set("x", x + 20.0)
                        .set("y", y + 12.0)
                        .add(node::Text::new(format!(
                            "{} ({:.1}%)",
                            point.label, point.percentage
                        ))),
                );
        }
        group
    }

    /// Build the SVG document
    pub fn document(&self) -> Document {
        let legend_width = if self.show_legend { self.size * 0.8 } else { 0.0 };
        let legend_height = if self.show_legend {
            self.data.data_points.len() as f64 * LEGEND_ROW + 20.0
        } else {
            0.0
        };
        let width = self.size + legend_width;
        let height = TITLE_HEIGHT + self.size.max(legend_height);

        let title = Text::new()
            .set("x", self.size / 2.0)
            .set("y", TITLE_HEIGHT * 0.65)
            .set("text-anchor", "middle")
            .set("font-family", "sans-serif")
            .set("font-size", 18)
            .add(node::Text::new(self.data.title.clone()));

        let mut document = Document::new()
            .set("viewBox", (0.0, 0.0, width, height))
            .set("width", width)
            .set("height", height)
            .add(title)
            .add(self.slices())
            .add(self.labels());
        if self.show_legend {
            document = document.add(self.legend());
        }
        document
    }

    pub fn to_svg_string(&self) -> String {
        self.document().to_string()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        svg::save(path, &self.document())?;
        log::info!("Wrote chart '{}' to {}", self.data.title, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spendmap_core::ChartDataPoint;

    fn point(label: &str, value: f64, percentage: f64, color: &str) -> ChartDataPoint {
        ChartDataPoint {
            label: label.to_string(),
            value,
            percentage,
            color: color.to_string(),
        }
    }

    fn data() -> ChartData {
        ChartData {
            title: "Spending (2022)".to_string(),
            data_points: vec![
                point("Groceries", 75.0, 75.0, "#FF6384"),
                point("Gas", 23.0, 23.0, "#36A2EB"),
                point("Fees", 2.0, 2.0, "#FFCE56"),
            ],
        }
    }

    #[test]
    fn test_slices_and_labels() {
        let data = data();
        let svg = PieChart::new(&data, &ChartConfig::default()).to_svg_string();

        assert_eq!(svg.matches("<path").count(), 3);
        assert!(svg.contains("75.0%"));
        assert!(svg.contains("23.0%"));
        // Too small for an in-slice label, still in the legend
        assert!(!svg.contains(">2.0%<"));
        assert!(svg.contains("Fees (2.0%)"));
        assert!(svg.contains("Spending (2022)"));
    }

    #[test]
    fn test_without_legend() {
        let data = data();
        let config = ChartConfig {
            show_legend: false,
            ..ChartConfig::default()
        };
        let svg = PieChart::new(&data, &config).to_svg_string();
        assert!(!svg.contains("<rect"));
        assert!(!svg.contains("Groceries"));
    }

    #[test]
    fn test_single_category_is_full_circle() {
        let data = ChartData {
            title: "Only".to_string(),
            data_points: vec![point("Rent", 1000.0, 100.0, "#4BC0C0")],
        };
        let svg = PieChart::new(&data, &ChartConfig::default()).to_svg_string();
        assert!(svg.contains("<circle"));
        assert!(!svg.contains("<path"));
        assert!(svg.contains("100.0%"));
    }

    #[test]
    fn test_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        let data = data();
        PieChart::new(&data, &ChartConfig::default()).save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
    }
}
