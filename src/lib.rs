//! Core library for the portfolio coverage dashboards.
//!
//! The library turns the published coverage workbook into the numbers the
//! dashboards draw: IO adapters (HTTP fetch, sheet decoding, report export)
//! live under [`kidy::coverage::io`], data representations inside
//! [`kidy::coverage::model`], and the validate → filter → aggregate stages in
//! their own modules. [`kidy::coverage::pipeline`] ties them together for one
//! refresh.

pub mod kidy;

pub use kidy::coverage::{
    CoverageError, Result, aggregate, error, filter, io, layout, model, pipeline, validate,
};
