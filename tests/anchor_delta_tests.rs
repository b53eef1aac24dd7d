//! End-to-end tests for anchor tracking and counter rewriting

use traceadjust::calendar::TimeZoneMode;
use traceadjust::{adjust_str, adjust_stream, AdjustConfig, AdjustError};

fn utc() -> AdjustConfig {
    AdjustConfig {
        time_zone: TimeZoneMode::Utc,
        ..AdjustConfig::default()
    }
}

fn banner(ctime: &str) -> String {
    format!(
        "*** traceadjust v{}: Base Timestamp Adjusted to '{}'",
        env!("CARGO_PKG_VERSION"),
        ctime
    )
}

#[test]
fn test_anchor_then_two_counters() {
    let input = "Trace file /u01/app/oracle/diag/orcl_ora_4242.trc\n\
                 *** 2017-03-13 09:23:21.767\n\
                 PARSING IN CURSOR tim=123456789\n\
                 tim=123460000\n";

    let output = adjust_str(input, &utc()).unwrap();
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "Trace file /u01/app/oracle/diag/orcl_ora_4242.trc");
    assert_eq!(lines[1], "*** 2017-03-13 09:23:21.767");
    assert_eq!(lines[2], banner("Mon Mar 13 09:23:21 2017"));
    assert_eq!(
        lines[3],
        "PARSING IN CURSOR tim=123.456789,delta=0,dslt=767000,local='2017 Mar 13 09:23:21.767000'"
    );
    assert_eq!(
        lines[4],
        "tim=123.460000,delta=3211,dslt=770211,local='2017 Mar 13 09:23:21.770211'"
    );
}

#[test]
fn test_local_zone_reports_same_deltas() {
    let input = "Trace file x.trc\n\
                 *** 2017-03-13 09:23:21.767\n\
                 PARSING IN CURSOR tim=123456789\n\
                 tim=123460000\n";

    let output = adjust_str(input, &AdjustConfig::default()).unwrap();
    assert!(output.contains("tim=123.456789,delta=0,dslt=767000,local='2017 Mar 13 09:23:21.767000'"));
    assert!(output.contains("tim=123.460000,delta=3211,dslt=770211,local='2017 Mar 13 09:23:21.770211'"));
}

#[test]
fn test_offset_rolls_over_seconds_and_minutes() {
    let input = "Trace file x.trc\n\
                 *** 2017-03-13 09:23:59.500000\n\
                 EXEC #139:c=0,e=10,p=0,cr=0,cu=0,mis=0,r=0,dep=0,og=1,plh=0,tim=1000000000\n\
                 FETCH #139:c=0,e=20,p=0,cr=3,cu=0,mis=0,r=1,dep=0,og=1,plh=0,tim=1000750000\n";

    let output = adjust_str(input, &utc()).unwrap();
    assert!(output.contains(
        "plh=0,tim=1000.750000,delta=750000,dslt=1250000,local='2017 Mar 13 09:24:00.250000'\n"
    ));
}

#[test]
fn test_negative_delta_moves_clock_back() {
    let input = "Trace file x.trc\n\
                 *** 2017-03-13 09:23:21.000\n\
                 tim=50000000\n\
                 tim=49000000\n";

    let output = adjust_str(input, &utc()).unwrap();
    assert!(output.contains("tim=49.000000,delta=-1000000,dslt=-1000000,local='2017 Mar 13 09:23:20.000000'"));
}

#[test]
fn test_new_anchor_resets_running_offset() {
    let input = "Trace file x.trc\n\
                 *** 2017-03-13 09:23:21.767\n\
                 tim=100000000\n\
                 tim=105000000\n\
                 *** 2017-03-13 10:00:00.001\n\
                 tim=900000000\n";

    let output = adjust_str(input, &utc()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[6], banner("Mon Mar 13 10:00:00 2017"));
    assert_eq!(
        lines[7],
        "tim=900.000000,delta=0,dslt=1000,local='2017 Mar 13 10:00:00.001000'"
    );
}

#[test]
fn test_counter_before_any_anchor() {
    let input = "Trace file x.trc\n\
                 tim=7000000\n\
                 tim=7000100\n";

    let output = adjust_str(input, &utc()).unwrap();
    assert!(output.contains("tim=7.000000,delta=0,dslt=0,local='no base timestamp'\n"));
    assert!(output.contains("tim=7.000100,delta=100,dslt=100,local='no base timestamp'\n"));
}

#[test]
fn test_plain_lines_byte_identical() {
    let input = "Trace file x.trc\n\
                 Oracle Database 12c Enterprise Edition Release 12.1.0.2.0 - 64bit Production\n\
                 \n\
                 =====================\n\
                 WAIT #0: nam='SQL*Net message to client' ela= 2 driver id=1650815232\n\
                 *** SESSION ID:(21.33) 2017-03-13 09:23:21.764\r\n";

    let output = adjust_str(input, &utc()).unwrap();
    assert_eq!(output, input);
}

#[test]
fn test_non_utf8_bytes_survive() {
    let mut input = b"Trace file x.trc\nselect '".to_vec();
    input.extend_from_slice(&[0xe9, 0xff]);
    input.extend_from_slice(b"' from dual tim=2000000 ");
    input.push(0xfe);
    input.push(b'\n');

    let mut out = Vec::new();
    adjust_stream(input.as_slice(), &mut out, &utc()).unwrap();

    let mut expected = b"Trace file x.trc\nselect '".to_vec();
    expected.extend_from_slice(&[0xe9, 0xff]);
    expected.extend_from_slice(b"' from dual tim=2.000000,delta=0,dslt=0,local='no base timestamp' ");
    expected.push(0xfe);
    expected.push(b'\n');
    assert_eq!(out, expected);
}

#[test]
fn test_rerun_does_not_retransform() {
    let input = "Trace file x.trc\n\
                 *** 2017-03-13 09:23:21.767\n\
                 PARSING IN CURSOR tim=123456789\n\
                 tim=123460000\n";

    let once = adjust_str(input, &utc()).unwrap();
    let twice = adjust_str(&once, &utc()).unwrap();

    let rewritten = |text: &str| -> Vec<String> {
        text.lines()
            .filter(|l| l.contains("tim="))
            .map(str::to_string)
            .collect()
    };
    assert_eq!(rewritten(&once), rewritten(&twice));
}

#[test]
fn test_malformed_anchor_is_fatal() {
    let input = "Trace file x.trc\n*** 2017-03-1x 09:23:21.767\ntim=1000000\n";
    let err = adjust_str(input, &utc()).unwrap_err();
    assert!(matches!(err, AdjustError::MalformedTimestamp { line: 2, .. }));
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn test_malformed_counter_is_fatal() {
    let input = "Trace file x.trc\nEXEC #1:c=0,tim=\n";
    let err = adjust_str(input, &utc()).unwrap_err();
    assert!(matches!(err, AdjustError::MalformedCounter { line: 2, .. }));
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn test_short_counter_is_zero_padded() {
    let input = "Trace file x.trc\n*** 2017-03-13 09:23:21.0\ntim=42\n";
    let output = adjust_str(input, &utc()).unwrap();
    assert!(output.contains("tim=0.000042,delta=0,dslt=0,local='2017 Mar 13 09:23:21.000000'"));
}
