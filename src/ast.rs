/// A raw property value as the parser sees it: an unparsed scalar token run,
/// or a (possibly nested) sequence of such runs. Coercion into typed values
/// happens during decode.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Scalar(String),
    Array(Vec<RawValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassNode {
    pub name: String,
    pub inherits: Option<String>,
    pub members: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNode {
    pub name: String,
    pub is_array: bool,
    pub value: RawValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Class(ClassNode),
    Property(PropertyNode),
}
