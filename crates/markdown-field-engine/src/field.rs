/// Plain form-field copy of the editor text, kept for conventional form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMirror {
    name: String,
    value: String,
}

impl FieldMirror {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the mirrored value with the current editor text
    pub fn sync(&mut self, text: &str) {
        if self.value != text {
            self.value.clear();
            self.value.push_str(text);
        }
    }

    /// Hidden form control carrying the value under the field name
    pub fn to_html(&self) -> String {
        format!(
            "<textarea name=\"{}\" hidden>{}</textarea>",
            html_escape::encode_double_quoted_attribute(&self.name),
            html_escape::encode_text(&self.value)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sync_replaces_value() {
        let mut field = FieldMirror::new("body");
        field.sync("first");
        field.sync("second");
        assert_eq!(field.value(), "second");
        assert_eq!(field.name(), "body");
    }

    #[test]
    fn test_to_html_escapes_name_and_value() {
        let mut field = FieldMirror::new("a\"b");
        field.sync("<script>&</script>");
        assert_eq!(
            field.to_html(),
            "<textarea name=\"a&quot;b\" hidden>&lt;script&gt;&amp;&lt;/script&gt;</textarea>"
        );
    }
}
