//! Conversion of scanned parameter segments into typed descriptors.

use super::StepParam;

/// Classify an angle-bracket run: a top-level `:` makes it special.
pub(crate) fn angle_param(prefix: Option<String>, body: String) -> StepParam {
    let Some(kind) = prefix else {
        return StepParam::Dynamic(body);
    };
    StepParam::Special {
        kind: kind.trim().to_owned(),
        value: body.trim().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(" file "), " data.txt ", StepParam::Special { kind: "file".into(), value: "data.txt".into() })]
    #[case(Some("table"), "", StepParam::Special { kind: "table".into(), value: String::new() })]
    #[case(None, "user name", StepParam::Dynamic("user name".into()))]
    fn classifies_angle_content(
        #[case] prefix: Option<&str>,
        #[case] body: &str,
        #[case] expected: StepParam,
    ) {
        assert_eq!(angle_param(prefix.map(str::to_owned), body.to_owned()), expected);
    }
}
