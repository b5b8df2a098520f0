//! Recognized HTTP request header fields.
//!
//! A [`HeaderField`] names one slot of a [`Request`](crate::http::request::Request).
//! The set is closed: only the fields declared here can be stored, anything else
//! received from a client is dropped by the reader.
//!
//! The declaration order below is also the order in which fields are written
//! back out by the [`serializer`](crate::http::serializer), so reordering the
//! table changes the bytes sent upstream.
//!
//! Names are matched case-sensitively against their canonical spelling.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

macro_rules! header_fields {
    (
        $(
            ($variant:ident, $name:expr);
        )+
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HeaderField {
            /// Pseudo-field holding `Method SP Request-URI SP HTTP-Version`.
            /// It has no wire name and is never looked up by name.
            RequestLine,
        $(
            $variant,
        )+
        }

        impl HeaderField {
            /// Every field in declaration order, `RequestLine` first.
            pub const ALL: &'static [HeaderField] = &[
                HeaderField::RequestLine,
                $(HeaderField::$variant,)+
            ];

            /// Canonical wire name, `None` for the `RequestLine` pseudo-field.
            pub const fn name(self) -> Option<&'static str> {
                match self {
                    HeaderField::RequestLine => None,
                    $(HeaderField::$variant => Some($name),)+
                }
            }
        }
    };
}

header_fields! {
    (Accept, "Accept");
    (AcceptCharset, "Accept-Charset");
    (AcceptEncoding, "Accept-Encoding");
    (AcceptLanguage, "Accept-Language");
    (AcceptDatetime, "Accept-Datetime");
    (Authorization, "Authorization");
    (CacheControl, "Cache-Control");
    (Connection, "Connection");
    (ProxyConnection, "Proxy-Connection");
    (Cookie, "Cookie");
    (ContentLength, "Content-Length");
    (ContentMd5, "Content-MD5");
    (ContentType, "Content-Type");
    (Date, "Date");
    (Expect, "Expect");
    (From, "From");
    (Host, "Host");
    (IfMatch, "If-Match");
    (IfModifiedSince, "If-Modified-Since");
    (IfNoneMatch, "If-None-Match");
    (IfRange, "If-Range");
    (IfUnmodifiedSince, "If-Unmodified-Since");
    (MaxForwards, "Max-Forwards");
    (Origin, "Origin");
    (Pragma, "Pragma");
    (ProxyAuthorization, "Proxy-Authorization");
    (Range, "Range");
    (Referer, "Referer");
    (Te, "TE");
    (UserAgent, "User-Agent");
    (Via, "Via");
    (Warning, "Warning");
}

/// Canonical name -> field, in declaration order.
static FIELDS_BY_NAME: Lazy<IndexMap<&'static str, HeaderField>> = Lazy::new(|| {
    HeaderField::headers()
        .filter_map(|field| field.name().map(|name| (name, field)))
        .collect()
});

impl HeaderField {
    /// Number of slots in a request, including the `RequestLine` slot.
    pub const COUNT: usize = Self::ALL.len();

    /// Slot position of this field inside a request.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Every real header field (no `RequestLine`) in declaration order.
    pub fn headers() -> impl Iterator<Item = HeaderField> {
        Self::ALL[1..].iter().copied()
    }
}

/// Looks up the field whose canonical name is exactly `name`.
///
/// Returns `None` for unknown names, for case variants of known names and for
/// the `RequestLine` pseudo-field, which has no name.
pub fn field_for_name(name: &str) -> Option<HeaderField> {
    FIELDS_BY_NAME.get(name).copied()
}

/// Canonical wire name of `field`; `None` only for `RequestLine`.
pub fn name_for_field(field: HeaderField) -> Option<&'static str> {
    field.name()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_named_field_round_trips() {
        for field in HeaderField::headers() {
            let name = name_for_field(field).unwrap();
            assert_eq!(field_for_name(name), Some(field), "{name}");
        }
    }

    #[test]
    fn table_covers_every_slot() {
        assert_eq!(HeaderField::COUNT, 33);
        assert_eq!(FIELDS_BY_NAME.len(), HeaderField::COUNT - 1);
        for (i, field) in HeaderField::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }

    #[test]
    fn request_line_has_no_name() {
        assert_eq!(name_for_field(HeaderField::RequestLine), None);
        assert_eq!(field_for_name("Request-Line"), None);
        assert_eq!(field_for_name(""), None);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(field_for_name("Content-Length"), Some(HeaderField::ContentLength));
        assert_eq!(field_for_name("content-length"), None);
        assert_eq!(field_for_name("HOST"), None);
        assert_eq!(field_for_name("TE"), Some(HeaderField::Te));
        assert_eq!(field_for_name("Content-MD5"), Some(HeaderField::ContentMd5));
    }

    #[test]
    fn unknown_names_miss() {
        assert_eq!(field_for_name("X-Forwarded-For"), None);
        assert_eq!(field_for_name("Host "), None);
    }
}
