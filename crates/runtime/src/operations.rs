use colored::*;
use log::{debug, info};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::backend::Backend;
use crate::frontend::registry::Operation;
use crate::state::ExecutionState;
use crate::values::{Detection, Detections, Image, Value};

const BLACK: [u8; 4] = [0, 0, 0, 255];
const BOX_COLOR: [u8; 4] = [255, 64, 64, 255];

#[derive(Debug, PartialEq, Error)]
pub enum OperationError {
    #[error("{} in {0}: no image loaded, use {} first", "Error".red().bold(), "Load".cyan())]
    NoImageLoaded(Operation),

    #[error("{} in {0}: the last result isn't a detection set, use {} or {} first", "Error".red().bold(), "Detect".cyan(), "Segment".cyan())]
    NoDetections(Operation),

    #[error("{} in {0}: the detection set is empty", "Error".red().bold())]
    EmptyDetections(Operation),

    #[error("{} in {operation}: argument {index} should be of type {expected}, found {found}", "Error".red().bold())]
    WrongArgType {
        operation: Operation,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{} in {0}: {1}", "Error".red().bold())]
    MissingArgument(Operation, &'static str),

    #[error("{} in Load: no path given and no {} file is active", "Error".red().bold(), "IN".cyan())]
    NoActiveFile,

    #[error("{} in Load: {0} does not represent a png, jpg, or jpeg image (content type {1})", "Error".red().bold())]
    NotAnImage(String, String),

    #[error("{} while reading or writing files: {0}", "Error".red().bold())]
    Io(String),

    #[error("{} while decoding or encoding image: {0}", "Error".red().bold())]
    Codec(String),

    #[error("{} while fetching image: {0}", "Error".red().bold())]
    Network(String),

    #[error("{} in {0}: no vision model is available in this interpreter", "Error".red().bold())]
    ModelUnavailable(Operation),
}

// Every dispatched operation has this shape. Say, Help, Exit and the block
// headers are handled by the interpreter itself.
pub type Handler =
    fn(&[Value], &mut ExecutionState, &mut dyn Backend) -> Result<Value, OperationError>;

pub fn handler(operation: Operation) -> Option<Handler> {
    match operation {
        Operation::Load => Some(load),
        Operation::Save => Some(save),
        Operation::Size => Some(size),
        Operation::Detect => Some(detect),
        Operation::Segment => Some(segment),
        Operation::Classify => Some(classify),
        Operation::Cutout => Some(cutout),
        Operation::Replace => Some(replace),
        Operation::Count => Some(count),
        Operation::CountInRegion => Some(count_in_region),
        Operation::Show => Some(show),
        Operation::Say | Operation::Help | Operation::Exit | Operation::In | Operation::If => None,
    }
}

pub fn load(
    args: &[Value],
    state: &mut ExecutionState,
    backend: &mut dyn Backend,
) -> Result<Value, OperationError> {
    let path = match (opt_str_arg(Operation::Load, args, 0)?, state.active_file()) {
        (Some(src), _) if is_url(src) => fetch_to_file(src, backend)?,
        (Some(src), _) => src.to_string(),
        // Load[] inside IN picks the file of the current iteration
        (None, Some(active)) => active.display().to_string(),
        (None, None) => return Err(OperationError::NoActiveFile),
    };

    debug!("Loading image {}", path);
    let image = backend.decode(Path::new(&path))?;
    state.loaded_image_name = Some(path);

    Ok(Value::Image(image))
}

pub fn save(
    args: &[Value],
    state: &mut ExecutionState,
    backend: &mut dyn Backend,
) -> Result<Value, OperationError> {
    let path = opt_str_arg(Operation::Save, args, 0)?
        .ok_or(OperationError::MissingArgument(Operation::Save, "a destination path is required"))?;
    let image = loaded_image(state, Operation::Save)?;

    backend.encode(image, Path::new(path))?;
    info!("Saved image to {}", path);

    Ok(Value::None)
}

pub fn size(
    _args: &[Value],
    state: &mut ExecutionState,
    _backend: &mut dyn Backend,
) -> Result<Value, OperationError> {
    let image = loaded_image(state, Operation::Size)?;

    Ok(Value::Size {
        width: image.width(),
        height: image.height(),
    })
}

pub fn detect(
    args: &[Value],
    state: &mut ExecutionState,
    backend: &mut dyn Backend,
) -> Result<Value, OperationError> {
    let classes = str_args(Operation::Detect, args)?;
    let image = loaded_image(state, Operation::Detect)?;

    let detections = backend.detect(image)?.retain_labels(&classes);
    debug!("Detect kept {} detections", detections.len());

    Ok(Value::Detections(detections))
}

pub fn segment(
    args: &[Value],
    state: &mut ExecutionState,
    backend: &mut dyn Backend,
) -> Result<Value, OperationError> {
    let prompts = str_args(Operation::Segment, args)?;
    if prompts.is_empty() {
        return Err(OperationError::MissingArgument(
            Operation::Segment,
            "a text prompt is required",
        ));
    }

    let image = loaded_image(state, Operation::Segment)?;

    Ok(Value::Detections(backend.segment(image, &prompts.join(" "))?))
}

pub fn classify(
    args: &[Value],
    state: &mut ExecutionState,
    backend: &mut dyn Backend,
) -> Result<Value, OperationError> {
    let labels = str_args(Operation::Classify, args)?;
    if labels.is_empty() {
        return Err(OperationError::MissingArgument(
            Operation::Classify,
            "at least one label is required",
        ));
    }

    let image = loaded_image(state, Operation::Classify)?;

    Ok(Value::Str(backend.classify(image, &labels)?))
}

// Crops the loaded image to the first detection
pub fn cutout(
    _args: &[Value],
    state: &mut ExecutionState,
    _backend: &mut dyn Backend,
) -> Result<Value, OperationError> {
    let bbox = first_detection(state, Operation::Cutout)?.bbox;
    let cropped = loaded_image(state, Operation::Cutout)?.crop(&bbox);

    state.loaded_image = Some(cropped);

    Ok(Value::None)
}

// Pastes a picture, or a black rectangle, over the first detection
pub fn replace(
    args: &[Value],
    state: &mut ExecutionState,
    backend: &mut dyn Backend,
) -> Result<Value, OperationError> {
    let bbox = first_detection(state, Operation::Replace)?.bbox;
    let (width, height) = (bbox.width() as u32, bbox.height() as u32);

    let patch = match opt_str_arg(Operation::Replace, args, 0)? {
        Some(path) => {
            let replacement = backend.decode(Path::new(path))?;
            backend.resize(&replacement, width, height)?
        }
        None => Image::filled(width, height, BLACK),
    };

    let mut image = loaded_image(state, Operation::Replace)?.clone();
    image.paste(&patch, bbox.x1.min(bbox.x2).max(0.) as u32, bbox.y1.min(bbox.y2).max(0.) as u32);
    state.loaded_image = Some(image);

    Ok(Value::None)
}

pub fn count(
    args: &[Value],
    state: &mut ExecutionState,
    _backend: &mut dyn Backend,
) -> Result<Value, OperationError> {
    let detections = last_detections(state, Operation::Count)?;

    let total = match args.first() {
        Some(_) => detections.count_class(int_arg(Operation::Count, args, 0)?),
        None => detections.len(),
    };

    Ok(Value::Int(total as i64))
}

pub fn count_in_region(
    args: &[Value],
    state: &mut ExecutionState,
    _backend: &mut dyn Backend,
) -> Result<Value, OperationError> {
    let op = Operation::CountInRegion;
    let (x1, y1) = (int_arg(op, args, 0)?, int_arg(op, args, 1)?);
    let (x2, y2) = (int_arg(op, args, 2)?, int_arg(op, args, 3)?);

    let detections = last_detections(state, op)?;
    let total = detections.count_in_region(x1 as f32, y1 as f32, x2 as f32, y2 as f32);

    Ok(Value::Int(total as i64))
}

// Displays the loaded image, with boxes when the last call detected something
pub fn show(
    _args: &[Value],
    state: &mut ExecutionState,
    backend: &mut dyn Backend,
) -> Result<Value, OperationError> {
    let mut image = loaded_image(state, Operation::Show)?.clone();

    let annotate = state.last_operation.is_some_and(|op| op.yields_detections());
    if let (true, Value::Detections(detections)) = (annotate, &state.last) {
        for det in &detections.items {
            image.draw_box(&det.bbox, BOX_COLOR, 2);
        }
    }

    backend.display(&image)?;

    Ok(Value::None)
}

// ---------
//  Helpers
// ---------
fn loaded_image(state: &ExecutionState, operation: Operation) -> Result<&Image, OperationError> {
    state
        .loaded_image
        .as_ref()
        .ok_or(OperationError::NoImageLoaded(operation))
}

fn last_detections(
    state: &ExecutionState,
    operation: Operation,
) -> Result<&Detections, OperationError> {
    match &state.last {
        Value::Detections(d) => Ok(d),
        _ => Err(OperationError::NoDetections(operation)),
    }
}

fn first_detection(state: &ExecutionState, operation: Operation) -> Result<&Detection, OperationError> {
    last_detections(state, operation)?
        .first()
        .ok_or(OperationError::EmptyDetections(operation))
}

fn opt_str_arg<'a>(
    operation: Operation,
    args: &'a [Value],
    index: usize,
) -> Result<Option<&'a str>, OperationError> {
    match args.get(index) {
        None => Ok(None),
        Some(v) => v.as_str().map(Some).ok_or(OperationError::WrongArgType {
            operation,
            index,
            expected: "string",
            found: v.type_name(),
        }),
    }
}

fn str_args(operation: Operation, args: &[Value]) -> Result<Vec<String>, OperationError> {
    (0..args.len())
        .map(|i| Ok(opt_str_arg(operation, args, i)?.unwrap_or_default().to_string()))
        .collect()
}

fn int_arg(operation: Operation, args: &[Value], index: usize) -> Result<i64, OperationError> {
    let found = args.get(index).map_or("none", |v| v.type_name());

    args.get(index)
        .and_then(Value::as_int)
        .ok_or(OperationError::WrongArgType {
            operation,
            index,
            expected: "int",
            found,
        })
}

fn is_url(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some(".png"),
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(".jpg"),
        _ => None,
    }
}

// Remote images are saved next to the program under a random name so the
// rest of the pipeline can treat them as plain files
fn fetch_to_file(url: &str, backend: &mut dyn Backend) -> Result<String, OperationError> {
    let fetched = backend.fetch(url)?;

    let extension = extension_for(&fetched.content_type)
        .ok_or_else(|| OperationError::NotAnImage(url.to_string(), fetched.content_type.clone()))?;

    let name = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect::<String>()
        + extension;

    fs::write(&name, &fetched.bytes).map_err(|e| OperationError::Io(format!("{}: {}", name, e)))?;
    info!("Fetched {} into {}", url, name);

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{detection, FakeBackend};

    fn state_with_image() -> ExecutionState {
        let mut state = ExecutionState::new();
        state.loaded_image = Some(Image::filled(100, 80, [255, 255, 255, 255]));
        state
    }

    fn with_detections(mut state: ExecutionState, items: Vec<Detection>) -> ExecutionState {
        state.last = Value::Detections(Detections::new(items));
        state.last_operation = Some(Operation::Detect);
        state
    }

    #[test]
    fn dispatch_table_skips_interpreter_operations() {
        for op in [Operation::Say, Operation::Help, Operation::Exit, Operation::In, Operation::If] {
            assert!(handler(op).is_none());
        }
        assert!(handler(Operation::CountInRegion).is_some());
    }

    #[test]
    fn size_of_loaded_image() {
        let mut state = state_with_image();
        let mut backend = FakeBackend::default();

        assert_eq!(
            size(&[], &mut state, &mut backend),
            Ok(Value::Size {
                width: 100,
                height: 80
            })
        );
    }

    #[test]
    fn size_without_image() {
        let mut state = ExecutionState::new();
        let mut backend = FakeBackend::default();

        assert_eq!(
            size(&[], &mut state, &mut backend),
            Err(OperationError::NoImageLoaded(Operation::Size))
        );
    }

    #[test]
    fn load_without_path_outside_iteration() {
        let mut state = ExecutionState::new();
        let mut backend = FakeBackend::default();

        assert_eq!(load(&[], &mut state, &mut backend), Err(OperationError::NoActiveFile));
    }

    #[test]
    fn load_records_source_name() {
        let mut state = ExecutionState::new();
        let mut backend = FakeBackend::default();

        let result = load(&[Value::Str("abbey.jpg".into())], &mut state, &mut backend).unwrap();

        assert!(matches!(result, Value::Image(_)));
        assert_eq!(state.loaded_image_name.as_deref(), Some("abbey.jpg"));
        assert_eq!(backend.decoded.borrow().as_slice(), ["abbey.jpg"]);
    }

    #[test]
    fn load_rejects_non_image_url() {
        let mut state = ExecutionState::new();
        let mut backend = FakeBackend {
            content_type: "text/html".into(),
            ..Default::default()
        };

        assert_eq!(
            load(&[Value::Str("https://example.com/page".into())], &mut state, &mut backend),
            Err(OperationError::NotAnImage(
                "https://example.com/page".into(),
                "text/html".into()
            ))
        );
    }

    #[test]
    fn load_rejects_wrong_type() {
        let mut state = ExecutionState::new();
        let mut backend = FakeBackend::default();

        assert!(matches!(
            load(&[Value::Int(3)], &mut state, &mut backend),
            Err(OperationError::WrongArgType { expected: "string", found: "int", .. })
        ));
    }

    #[test]
    fn detect_filters_requested_classes() {
        let mut state = state_with_image();
        let mut backend = FakeBackend::with_detections(vec![
            detection("person", 0, (0., 0., 10., 10.)),
            detection("cat", 15, (20., 20., 30., 30.)),
        ]);

        let only_cats = detect(&[Value::Str("cat".into())], &mut state, &mut backend).unwrap();
        let everything = detect(&[], &mut state, &mut backend).unwrap();

        assert!(matches!(only_cats, Value::Detections(d) if d.len() == 1));
        assert!(matches!(everything, Value::Detections(d) if d.len() == 2));
    }

    #[test]
    fn count_with_and_without_class() {
        let mut state = with_detections(
            state_with_image(),
            vec![
                detection("person", 0, (0., 0., 10., 10.)),
                detection("cat", 15, (20., 20., 30., 30.)),
                detection("person", 0, (40., 40., 50., 50.)),
            ],
        );
        let mut backend = FakeBackend::default();

        assert_eq!(count(&[], &mut state, &mut backend), Ok(Value::Int(3)));
        assert_eq!(count(&[Value::Int(0)], &mut state, &mut backend), Ok(Value::Int(2)));
    }

    #[test]
    fn count_in_region_empty_and_full() {
        let mut state = with_detections(
            state_with_image(),
            vec![
                detection("person", 0, (20., 20., 30., 30.)),
                detection("person", 0, (40., 40., 50., 50.)),
            ],
        );
        let mut backend = FakeBackend::default();
        let region = |a: i64, b: i64, c: i64, d: i64| {
            vec![Value::Int(a), Value::Int(b), Value::Int(c), Value::Int(d)]
        };

        assert_eq!(
            count_in_region(&region(0, 0, 10, 10), &mut state, &mut backend),
            Ok(Value::Int(0))
        );
        assert_eq!(
            count_in_region(&region(0, 0, 60, 60), &mut state, &mut backend),
            Ok(Value::Int(2))
        );
    }

    #[test]
    fn count_needs_detections() {
        let mut state = state_with_image();
        let mut backend = FakeBackend::default();

        assert_eq!(
            count(&[], &mut state, &mut backend),
            Err(OperationError::NoDetections(Operation::Count))
        );
    }

    #[test]
    fn cutout_crops_to_first_box() {
        let mut state = with_detections(
            state_with_image(),
            vec![
                detection("person", 0, (10., 20., 40., 60.)),
                detection("person", 0, (0., 0., 5., 5.)),
            ],
        );
        let mut backend = FakeBackend::default();

        cutout(&[], &mut state, &mut backend).unwrap();

        let img = state.loaded_image.unwrap();
        assert_eq!((img.width(), img.height()), (30, 40));
    }

    #[test]
    fn cutout_on_empty_detections() {
        let mut state = with_detections(state_with_image(), vec![]);
        let mut backend = FakeBackend::default();

        assert_eq!(
            cutout(&[], &mut state, &mut backend),
            Err(OperationError::EmptyDetections(Operation::Cutout))
        );
    }

    #[test]
    fn replace_pastes_black_box() {
        let mut state = with_detections(
            state_with_image(),
            vec![detection("person", 0, (10., 10., 20., 20.))],
        );
        let mut backend = FakeBackend::default();

        replace(&[], &mut state, &mut backend).unwrap();

        let img = state.loaded_image.unwrap();
        assert_eq!(img.pixel(15, 15), Some(BLACK));
        assert_eq!(img.pixel(25, 25), Some([255, 255, 255, 255]));
        assert_eq!((img.width(), img.height()), (100, 80));
    }

    #[test]
    fn show_annotates_after_detect() {
        let mut state = with_detections(
            state_with_image(),
            vec![detection("person", 0, (10., 10., 20., 20.))],
        );
        let mut backend = FakeBackend::default();

        show(&[], &mut state, &mut backend).unwrap();

        let shown = backend.displayed.borrow();
        assert_eq!(shown[0].pixel(10, 10), Some(BOX_COLOR));
        // The loaded image itself stays clean
        assert_eq!(
            state.loaded_image.as_ref().and_then(|i| i.pixel(10, 10)),
            Some([255, 255, 255, 255])
        );
    }

    #[test]
    fn classify_needs_labels() {
        let mut state = state_with_image();
        let mut backend = FakeBackend::default();

        assert!(matches!(
            classify(&[], &mut state, &mut backend),
            Err(OperationError::MissingArgument(Operation::Classify, _))
        ));
        assert_eq!(
            classify(
                &[Value::Str("cat".into()), Value::Str("dog".into())],
                &mut state,
                &mut backend
            ),
            Ok(Value::Str("cat".into()))
        );
    }

    #[test]
    fn content_types() {
        assert_eq!(extension_for("image/png"), Some(".png"));
        assert_eq!(extension_for("image/jpeg"), Some(".jpg"));
        assert_eq!(extension_for("application/json"), None);
    }
}
