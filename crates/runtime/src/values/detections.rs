use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).abs()
    }

    // Whole box within the region, borders included
    pub fn is_inside(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
        self.x1 >= x1 && self.y1 >= y1 && self.x2 <= x2 && self.y2 <= y2
    }
}

impl Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} {} {} {}]", self.x1, self.y1, self.x2, self.y2)
    }
}

// Segmentation mask, row-major, same size as the source picture
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    pub width: u32,
    pub height: u32,
    pub data: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub class_id: i64,
    pub label: String,
    pub confidence: f32,
    pub mask: Option<Mask>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Detections {
    pub items: Vec<Detection>,
}

impl Detections {
    pub fn new(items: Vec<Detection>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&Detection> {
        self.items.first()
    }

    pub fn count_class(&self, class_id: i64) -> usize {
        self.items.iter().filter(|d| d.class_id == class_id).count()
    }

    pub fn count_in_region(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> usize {
        self.items
            .iter()
            .filter(|d| d.bbox.is_inside(x1, y1, x2, y2))
            .count()
    }

    // Keeps detections whose label is listed. An empty list keeps everything.
    pub fn retain_labels(self, labels: &[String]) -> Self {
        if labels.is_empty() {
            return self;
        }

        Self {
            items: self
                .items
                .into_iter()
                .filter(|d| labels.contains(&d.label))
                .collect(),
        }
    }
}
