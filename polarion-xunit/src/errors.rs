// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use quick_xml::events::attributes::AttrError;
use std::{io, string::FromUtf8Error};
use thiserror::Error;

/// An error that occurs while serializing a [`Report`](crate::Report).
///
/// Returned by [`Report::serialize`](crate::Report::serialize) and
/// [`Report::to_string`](crate::Report::to_string).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializeError {
    /// The underlying writer failed.
    #[error("error writing XUnit report")]
    Io(#[from] io::Error),

    /// The XML writer rejected an event.
    #[error("error serializing XUnit report")]
    Xml(#[from] quick_xml::Error),

    /// The serialized report was not valid UTF-8.
    #[error("serialized XUnit report is not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),
}

/// An error that occurs while reading a [`Report`](crate::Report) from XML.
///
/// Returned by [`Report::deserialize_str`](crate::Report::deserialize_str).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeserializeError {
    /// The document is not well-formed XML.
    #[error("error parsing XUnit XML")]
    Xml(#[from] quick_xml::Error),

    /// An attribute could not be parsed.
    #[error("error parsing XUnit XML attribute")]
    Attr(#[from] AttrError),

    /// The root element is neither `<testsuites>` nor `<testsuite>`.
    #[error("document root is <{name}>, expected <testsuites> or <testsuite>")]
    UnexpectedRoot {
        /// The name of the root element that was found.
        name: String,
    },

    /// The document doesn't contain any element.
    #[error("document contains no <testsuites> or <testsuite> element")]
    MissingRoot,

    /// The document ends before an element is closed.
    #[error("document ends before </{element}>")]
    Truncated {
        /// The innermost element left open.
        element: &'static str,
    },

    /// An element was found outside of the element it must be nested in.
    #[error("<{element}> found outside of <{parent}>")]
    Misplaced {
        /// The misplaced element.
        element: &'static str,

        /// The element it must be nested in.
        parent: &'static str,
    },

    /// A required attribute is missing.
    #[error("<{element}> is missing required attribute `{attr}`")]
    MissingAttribute {
        /// The element the attribute belongs to.
        element: &'static str,

        /// The name of the missing attribute.
        attr: &'static str,
    },

    /// An attribute has a value that could not be interpreted.
    #[error("invalid value `{value}` for attribute `{attr}` of <{element}>")]
    InvalidAttribute {
        /// The element the attribute belongs to.
        element: &'static str,

        /// The name of the attribute.
        attr: &'static str,

        /// The value that failed to parse.
        value: String,
    },
}
