use crate::error::{DaikinError, Result};
use std::collections::HashMap;

/// HTTP paths of the unit's control protocol
pub mod paths {
    pub const BASIC_INFO: &str = "/common/basic_info";
    pub const REMOTE_METHOD: &str = "/common/get_remote_method";
    pub const MODEL_INFO: &str = "/aircon/get_model_info";
    pub const CONTROL_INFO: &str = "/aircon/get_control_info";
    pub const SET_CONTROL_INFO: &str = "/aircon/set_control_info";
    pub const SENSOR_INFO: &str = "/aircon/get_sensor_info";
    pub const TIMER: &str = "/aircon/get_timer";
    pub const PRICE: &str = "/aircon/get_price";
    pub const TARGET: &str = "/aircon/get_target";
    pub const WEEK_POWER: &str = "/aircon/get_week_power";
    pub const YEAR_POWER: &str = "/aircon/get_year_power";
    pub const PROGRAM: &str = "/aircon/get_program";
    pub const SCHEDULE_TIMER: &str = "/aircon/get_scdltimer";
    pub const NOTIFY: &str = "/aircon/get_notify";
}

/// Key carrying the request status in every response
pub const RET_KEY: &str = "ret";

/// `ret` value for an accepted request
pub const RET_OK: &str = "OK";

/// `ret` value a unit sends for a rejected parameter
pub const RET_BAD_PARAM: &str = "PARAM NG";

/// Raw values of one response, keyed by wire key
pub type Values = HashMap<String, String>;

/// Parse a response body of the form `key=value,key=value,...`
///
/// The body must hold exactly one non-blank line. Values may contain `=`;
/// only the first one in each token separates key from value. A `ret`
/// other than `OK` is reported as [`DaikinError::Device`]; a missing `ret`
/// is accepted.
pub fn parse_response(body: &str) -> Result<Values> {
    let mut records = body.lines().filter(|line| !line.trim().is_empty());

    let (record, extra) = (records.next(), records.count());
    let record = match record {
        Some(record) if extra == 0 => record,
        _ => {
            let found = usize::from(record.is_some()) + extra;
            return Err(DaikinError::Frame(format!(
                "expected exactly one record, found {}",
                found
            )));
        }
    };

    let mut values = Values::new();
    // Empty tokens come from a trailing or doubled comma
    let tokens = record.trim_end_matches('\r').split(',');
    for token in tokens.filter(|token| !token.is_empty()) {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| DaikinError::Frame(format!("token without '=': {:?}", token)))?;
        values.insert(key.to_string(), value.to_string());
    }

    match values.get(RET_KEY) {
        Some(ret) if ret != RET_OK => Err(DaikinError::Device { ret: ret.clone() }),
        _ => Ok(values),
    }
}

/// Require an explicit `ret=OK`, as the unit sends after a state change.
pub(crate) fn ensure_ok(values: &Values) -> Result<()> {
    match values.get(RET_KEY) {
        Some(ret) if ret == RET_OK => Ok(()),
        Some(ret) => Err(DaikinError::Device { ret: ret.clone() }),
        None => Err(DaikinError::Device { ret: String::new() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_record() {
        let values = parse_response("ret=OK,pow=1,mode=3").unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values["ret"], "OK");
        assert_eq!(values["pow"], "1");
        assert_eq!(values["mode"], "3");
    }

    #[test]
    fn value_keeps_later_equals_signs() {
        let values = parse_response("ret=OK,expr=a=b").unwrap();
        assert_eq!(values["expr"], "a=b");
    }

    #[test]
    fn trailing_newline_is_one_record() {
        let values = parse_response("ret=OK,htemp=21.0\r\n").unwrap();
        assert_eq!(values["htemp"], "21.0");
    }

    #[test]
    fn two_rows_fail() {
        match parse_response("a=1\nb=2") {
            Err(DaikinError::Frame(msg)) => assert!(msg.contains("found 2")),
            other => panic!("expected frame error, got {:?}", other),
        }
    }

    #[test]
    fn empty_body_fails() {
        assert!(matches!(parse_response(""), Err(DaikinError::Frame(_))));
        assert!(matches!(parse_response("\n\n"), Err(DaikinError::Frame(_))));
    }

    #[test]
    fn trailing_comma_is_ignored() {
        let values = parse_response("ret=OK,pow=1,").unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["pow"], "1");

        let values = parse_response("ret=OK,,mode=4\r\n").unwrap();
        assert_eq!(values["mode"], "4");
    }

    #[test]
    fn token_without_separator_fails() {
        assert!(matches!(
            parse_response("ret=OK,garbage"),
            Err(DaikinError::Frame(_))
        ));
    }

    #[test]
    fn device_rejection_is_surfaced() {
        match parse_response("ret=PARAM NG") {
            Err(DaikinError::Device { ret }) => assert_eq!(ret, RET_BAD_PARAM),
            other => panic!("expected device error, got {:?}", other),
        }
    }

    #[test]
    fn missing_ret_is_accepted_but_not_ok() {
        let values = parse_response("pow=0").unwrap();
        assert!(ensure_ok(&values).unwrap_err().is_device_error());
        assert!(ensure_ok(&parse_response("ret=OK").unwrap()).is_ok());
    }
}
