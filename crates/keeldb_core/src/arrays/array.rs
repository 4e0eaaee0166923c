/// A single typed column of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    Boolean(Vec<bool>),
    Int64(Vec<i64>),
    Utf8(Vec<String>),
}

impl Array {
    /// Logical number of values in the array.
    pub fn logical_len(&self) -> usize {
        match self {
            Array::Boolean(v) => v.len(),
            Array::Int64(v) => v.len(),
            Array::Utf8(v) => v.len(),
        }
    }
}

impl From<Vec<bool>> for Array {
    fn from(v: Vec<bool>) -> Self {
        Array::Boolean(v)
    }
}

impl From<Vec<i64>> for Array {
    fn from(v: Vec<i64>) -> Self {
        Array::Int64(v)
    }
}

impl From<Vec<String>> for Array {
    fn from(v: Vec<String>) -> Self {
        Array::Utf8(v)
    }
}
