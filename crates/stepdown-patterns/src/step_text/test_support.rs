//! Test helpers for asserting scanner outcomes.
use super::lexer::{Segment, scan_step_text};
use crate::errors::StepTextError;

pub(crate) fn scan_ok(text: &str) -> Vec<Segment> {
    match scan_step_text(text) {
        Ok(segments) => segments,
        Err(err) => panic!("step text should scan: {err}"),
    }
}

pub(crate) fn scan_err(text: &str) -> StepTextError {
    match scan_step_text(text) {
        Ok(segments) => panic!("step text scanning should fail, got {segments:?}"),
        Err(err) => err,
    }
}
