use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::backend::{Backend, Fetched};
use crate::interpreter::Interpreter;
use crate::operations::OperationError;
use crate::state::ExecutionState;
use crate::values::{BoundingBox, Detection, Detections, Image};

// Deterministic stand-in for the outside world. Decoded paths and displayed
// images are shared so tests can look at them after the backend is boxed.
pub struct FakeBackend {
    pub detections: Detections,
    pub content_type: String,
    pub decoded: Rc<RefCell<Vec<String>>>,
    pub displayed: Rc<RefCell<Vec<Image>>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            detections: Detections::default(),
            content_type: "image/png".into(),
            decoded: Default::default(),
            displayed: Default::default(),
        }
    }
}

impl FakeBackend {
    pub fn with_detections(items: Vec<Detection>) -> Self {
        Self {
            detections: Detections::new(items),
            ..Default::default()
        }
    }
}

impl Backend for FakeBackend {
    fn decode(&mut self, path: &Path) -> Result<Image, OperationError> {
        self.decoded.borrow_mut().push(path.display().to_string());
        Ok(Image::filled(16, 16, [200, 200, 200, 255]))
    }

    fn encode(&mut self, _image: &Image, _path: &Path) -> Result<(), OperationError> {
        Ok(())
    }

    fn resize(&mut self, _image: &Image, width: u32, height: u32) -> Result<Image, OperationError> {
        Ok(Image::filled(width, height, [10, 20, 30, 255]))
    }

    fn fetch(&mut self, _url: &str) -> Result<Fetched, OperationError> {
        Ok(Fetched {
            bytes: vec![],
            content_type: self.content_type.clone(),
        })
    }

    fn detect(&mut self, _image: &Image) -> Result<Detections, OperationError> {
        Ok(self.detections.clone())
    }

    fn segment(&mut self, _image: &Image, _prompt: &str) -> Result<Detections, OperationError> {
        Ok(self.detections.clone())
    }

    fn classify(&mut self, _image: &Image, labels: &[String]) -> Result<String, OperationError> {
        Ok(labels.first().cloned().unwrap_or_default())
    }

    fn display(&mut self, image: &Image) -> Result<(), OperationError> {
        self.displayed.borrow_mut().push(image.clone());
        Ok(())
    }
}

pub fn detection(label: &str, class_id: i64, bbox: (f32, f32, f32, f32)) -> Detection {
    Detection {
        bbox: BoundingBox::new(bbox.0, bbox.1, bbox.2, bbox.3),
        class_id,
        label: label.into(),
        confidence: 0.9,
        mask: None,
    }
}

// Parses and runs a program, returns what it printed and the final state
pub fn run_with(backend: FakeBackend, code: &str) -> (String, ExecutionState) {
    let nodes = frontend::parse_source(code).expect("Should parse");
    let mut interpreter = Interpreter::with_output(Box::new(backend), Vec::new());
    let mut state = ExecutionState::new();

    interpreter
        .execute_program(&nodes, &mut state)
        .expect("Should run");

    (String::from_utf8_lossy(interpreter.output()).into_owned(), state)
}

pub fn run(code: &str) -> (String, ExecutionState) {
    run_with(FakeBackend::default(), code)
}
