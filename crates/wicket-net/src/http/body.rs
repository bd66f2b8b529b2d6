//! Request payload types.

use bytes::Bytes;

/// A file attached to a form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormFile {
    /// The file name reported to the server.
    pub file_name: String,
    /// The MIME type of the content, if known.
    pub mime_type: Option<String>,
    /// The file content.
    pub bytes: Bytes,
}

/// The value of a single form field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormDataValue {
    /// A plain text value.
    Text(String),
    /// A file-like blob.
    File(FormFile),
}

impl FormDataValue {
    /// The value as it appears in a query string or JSON document.
    ///
    /// Files are represented by their file name.
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::File(file) => &file.file_name,
        }
    }
}

impl From<String> for FormDataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FormDataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<FormFile> for FormDataValue {
    fn from(file: FormFile) -> Self {
        Self::File(file)
    }
}

/// An ordered multimap of form fields.
///
/// Field order is preserved and a name may appear more than once.
///
/// ```
/// use wicket_net::http::FormData;
///
/// let form = FormData::new()
///     .text("tag", "a")
///     .text("tag", "b")
///     .text("page", "2");
///
/// assert_eq!(form.get_all("tag").collect::<Vec<_>>(), vec!["a", "b"]);
/// assert_eq!(form.len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, FormDataValue)>,
}

impl FormData {
    /// Create an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, FormDataValue::Text(value.into()));
        self
    }

    /// Append a file field.
    pub fn file_bytes(
        mut self,
        name: impl Into<String>,
        bytes: impl Into<Bytes>,
        file_name: impl Into<String>,
        mime_type: Option<&str>,
    ) -> Self {
        let file = FormFile {
            file_name: file_name.into(),
            mime_type: mime_type.map(str::to_string),
            bytes: bytes.into(),
        };
        self.append(name, FormDataValue::File(file));
        self
    }

    /// Append a field in place.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<FormDataValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// All fields in insertion order.
    pub fn entries(&self) -> &[(String, FormDataValue)] {
        &self.entries
    }

    /// The first text representation of the field called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).next()
    }

    /// Every text representation of the fields called `name`, in order.
    pub fn get_all<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a str> + use<'a, 'n> {
        self.entries
            .iter()
            .filter(move |(field, _)| field == name)
            .map(|(_, value)| value.as_text())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the form has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<FormDataValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Self::new();
        for (name, value) in iter {
            form.append(name, value);
        }
        form
    }
}

/// The payload of a fetch request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchRequestBody {
    /// Structured form fields.
    Form(FormData),
    /// A raw string, sent as-is.
    Text(String),
}

impl FetchRequestBody {
    /// Structured fields of the payload. A raw string has none.
    pub fn entries(&self) -> &[(String, FormDataValue)] {
        match self {
            Self::Form(form) => form.entries(),
            Self::Text(_) => &[],
        }
    }
}

impl From<FormData> for FetchRequestBody {
    fn from(form: FormData) -> Self {
        Self::Form(form)
    }
}

impl From<String> for FetchRequestBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for FetchRequestBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}
