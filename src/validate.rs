//! Required-attribute checks for structured payloads.

/// A payload with attributes that must be non-empty.
pub trait Validate {
    /// Name used when describing a defective value, e.g. "ref" or "error".
    const ELEMENT: &'static str;

    /// The attributes that are missing, phrased with their article
    /// ("a type", "an id").
    fn missing_attributes(&self) -> Vec<&'static str>;

    /// One human-readable line per missing attribute.
    ///
    /// `index` is the position of this value inside an array payload; it is
    /// `None` for payloads that are a single object.
    fn defects(&self, index: Option<usize>) -> Vec<String> {
        self.missing_attributes()
            .into_iter()
            .map(|attribute| match index {
                Some(index) => format!("{} {index} is missing {attribute}", Self::ELEMENT),
                None => format!("{} is missing {attribute}", Self::ELEMENT),
            })
            .collect()
    }
}

/// Collect the defects of every element of an array payload.
///
/// Every element is inspected; the result is empty only when all of them are
/// valid.
pub fn batch_defects<T: Validate>(items: &[T]) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .flat_map(|(index, item)| item.defects(Some(index)))
        .collect()
}
