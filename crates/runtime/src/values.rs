use std::fmt::Display;

mod detections;
mod picture;

pub use detections::{BoundingBox, Detection, Detections, Mask};
pub use picture::Image;

// Everything a statement can produce. `last` and variables hold any of them.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    Size {
        width: u32,
        height: u32,
    },
    Image(Image),
    Detections(Detections),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::Size { .. } => "size",
            Value::Image(_) => "image",
            Value::Detections(_) => "detections",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Int(nb) => write!(f, "{}", nb),
            Value::Str(s) => write!(f, "{}", s),
            Value::Size { width, height } => write!(f, "({}, {})", width, height),
            Value::Image(img) => write!(f, "<image {}x{}>", img.width(), img.height()),
            Value::Detections(d) => write!(f, "<{} detections>", d.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_values() {
        assert_eq!(Value::None.to_string(), "None");
        assert_eq!(Value::Bool(false).to_string(), "False");
        assert_eq!(Value::Str("cat".into()).to_string(), "cat");
        assert_eq!(
            Value::Size {
                width: 640,
                height: 480
            }
            .to_string(),
            "(640, 480)"
        );
        assert_eq!(Value::Image(Image::filled(3, 2, [0, 0, 0, 255])).to_string(), "<image 3x2>");
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(Value::Int(1), Value::Int(1));
        assert_ne!(Value::Int(1), Value::Str("1".into()));
        assert_ne!(Value::Bool(false), Value::None);
    }
}
