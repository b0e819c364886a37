use std::fmt::Display;

/// Every operation the language knows about. The parser refuses any call
/// whose name is not one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Save,
    Size,
    Say,
    Detect,
    Replace,
    Cutout,
    Count,
    Segment,
    CountInRegion,
    Classify,
    Show,
    In,
    If,
    Exit,
    Help,
}

impl Operation {
    pub const ALL: [Operation; 16] = [
        Operation::Load,
        Operation::Save,
        Operation::Size,
        Operation::Say,
        Operation::Detect,
        Operation::Replace,
        Operation::Cutout,
        Operation::Count,
        Operation::Segment,
        Operation::CountInRegion,
        Operation::Classify,
        Operation::Show,
        Operation::In,
        Operation::If,
        Operation::Exit,
        Operation::Help,
    ];

    // Name used by Help and by the diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Load => "Load",
            Operation::Save => "Save",
            Operation::Size => "Size",
            Operation::Say => "Say",
            Operation::Detect => "Detect",
            Operation::Replace => "Replace",
            Operation::Cutout => "Cutout",
            Operation::Count => "Count",
            Operation::Segment => "Segment",
            Operation::CountInRegion => "CountInRegion",
            Operation::Classify => "Classify",
            Operation::Show => "Show",
            Operation::In => "In",
            Operation::If => "If",
            Operation::Exit => "Exit",
            Operation::Help => "Help",
        }
    }

    // Spelling expected in source code. Only the block headers differ from the name
    pub fn keyword(&self) -> &'static str {
        match self {
            Operation::In => "IN",
            Operation::If => "IF",
            _ => self.name(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Operation::Load => "Load an image",
            Operation::Save => "Save an image",
            Operation::Size => "Get the size of the image (width, height)",
            Operation::Say => "Say the result of the last function",
            Operation::Detect => "Find objects in the image",
            Operation::Replace => "Replace the last detections with a random image",
            Operation::Cutout => "Cutout the last detections",
            Operation::Count => "Count the last detections",
            Operation::Segment => "Segment the image",
            Operation::CountInRegion => "Count the last detections in the region (x1, y1, x2, y2)",
            Operation::Classify => "Classify the image in the provided categories",
            Operation::Show => "Show the image",
            Operation::In => "Iterate over the files in a directory",
            Operation::If => "If statement",
            Operation::Exit => "Exit the program",
            Operation::Help => "Print the description of a function",
        }
    }

    // Lookup from source text: block headers only exist in upper case
    pub fn from_keyword(word: &str) -> Option<Operation> {
        Self::ALL.into_iter().find(|op| op.keyword() == word)
    }

    // Lookup for Help topics, which accept both spellings
    pub fn from_name(word: &str) -> Option<Operation> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == word || op.keyword() == word)
    }

    pub fn is_block_header(&self) -> bool {
        matches!(self, Operation::In | Operation::If)
    }

    // Operations whose result is a detection set
    pub fn yields_detections(&self) -> bool {
        matches!(self, Operation::Detect | Operation::Segment)
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}
