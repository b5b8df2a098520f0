use crate::http::headers::HeaderField;

/// A single HTTP/1.x request as seen by the proxy.
///
/// Storage is a fixed array with one slot per [`HeaderField`], indexed by the
/// field itself, so each recognized header holds at most one value and the
/// arrival order of headers is not kept.
///
/// The `RequestLine` slot holds the request-line exactly as received until
/// [`rewrite_request_line_to_origin_form`](crate::http::serializer::rewrite_request_line_to_origin_form)
/// replaces it with its origin-form version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    slots: [Option<String>; HeaderField::COUNT],
    origin_form: bool,
}

impl Request {
    /// Creates a request with every slot absent.
    pub fn new() -> Self {
        Self {
            slots: [const { None }; HeaderField::COUNT],
            origin_form: false,
        }
    }

    /// Stores `value` in the slot of `field`, replacing any previous value.
    ///
    /// Line terminators are not allowed inside a value; anything from the
    /// first `\r` or `\n` on is cut off.
    pub fn set(&mut self, field: HeaderField, value: &str) {
        let value = match value.find(['\r', '\n']) {
            Some(end) => &value[..end],
            None => value,
        };

        if field == HeaderField::RequestLine {
            self.origin_form = false;
        }
        self.slots[field.index()] = Some(value.to_string());
    }

    pub fn get(&self, field: HeaderField) -> Option<&str> {
        self.slots[field.index()].as_deref()
    }

    pub fn contains(&self, field: HeaderField) -> bool {
        self.slots[field.index()].is_some()
    }

    pub fn request_line(&self) -> Option<&str> {
        self.get(HeaderField::RequestLine)
    }

    /// True once the request-line has been rewritten to origin form.
    pub fn is_origin_form(&self) -> bool {
        self.origin_form
    }

    /// Replaces the request-line with its rewritten form and marks it so that
    /// later rewrites leave it alone.
    pub(crate) fn set_origin_form_line(&mut self, line: String) {
        self.slots[HeaderField::RequestLine.index()] = Some(line);
        self.origin_form = true;
    }

    /// Present header fields (no `RequestLine`) in declaration order.
    pub fn headers(&self) -> impl Iterator<Item = (HeaderField, &str)> {
        HeaderField::headers().filter_map(|field| self.get(field).map(|value| (field, value)))
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_is_empty() {
        let req = Request::new();
        assert!(HeaderField::ALL.iter().all(|f| !req.contains(*f)));
        assert_eq!(req.request_line(), None);
        assert!(!req.is_origin_form());
    }

    #[test]
    fn set_replaces_previous_value() {
        let mut req = Request::new();
        req.set(HeaderField::Host, "a.com");
        req.set(HeaderField::Host, "b.com");
        assert_eq!(req.get(HeaderField::Host), Some("b.com"));
    }

    #[test]
    fn set_cuts_value_at_line_terminator() {
        let mut req = Request::new();
        req.set(HeaderField::Cookie, "a=1\r\nX-Injected: yes");
        assert_eq!(req.get(HeaderField::Cookie), Some("a=1"));
    }

    #[test]
    fn headers_follow_declaration_order() {
        let mut req = Request::new();
        req.set(HeaderField::UserAgent, "test");
        req.set(HeaderField::RequestLine, "GET / HTTP/1.1");
        req.set(HeaderField::Accept, "*/*");
        req.set(HeaderField::Host, "x.com");

        let fields: Vec<_> = req.headers().map(|(f, _)| f).collect();
        assert_eq!(
            fields,
            vec![HeaderField::Accept, HeaderField::Host, HeaderField::UserAgent]
        );
    }

    #[test]
    fn storing_a_new_request_line_clears_origin_form_mark() {
        let mut req = Request::new();
        req.set_origin_form_line("GET / HTTP/1.1".to_string());
        assert!(req.is_origin_form());

        req.set(HeaderField::RequestLine, "GET http://a.com/ HTTP/1.1");
        assert!(!req.is_origin_form());
    }
}
