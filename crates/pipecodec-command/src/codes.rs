//! Built-in command codes.
//!
//! Codes below 50 flow from the host to the task (downward); codes from 50 up
//! flow from the task back to the host (upward).

pub const START_MESSAGE: i32 = 0;
pub const SET_JOB_CONF: i32 = 1;
pub const SET_INPUT_TYPES: i32 = 2;
pub const RUN_MAP: i32 = 3;
pub const MAP_ITEM: i32 = 4;
pub const RUN_REDUCE: i32 = 5;
pub const REDUCE_KEY: i32 = 6;
pub const REDUCE_VALUE: i32 = 7;
pub const CLOSE: i32 = 8;
pub const ABORT: i32 = 9;
pub const AUTHENTICATION_REQ: i32 = 10;

pub const OUTPUT: i32 = 50;
pub const PARTITIONED_OUTPUT: i32 = 51;
pub const STATUS: i32 = 52;
pub const PROGRESS: i32 = 53;
pub const DONE: i32 = 54;
pub const REGISTER_COUNTER: i32 = 55;
pub const INCREMENT_COUNTER: i32 = 56;
pub const AUTHENTICATION_RESP: i32 = 57;

/// First code of the upward (task to host) range.
pub const UPWARD_START: i32 = 50;

/// `(code, name, rule)` for every built-in command, ordered by code.
pub const PIPES_COMMANDS: [(i32, &str, &str); 19] = [
    (START_MESSAGE, "START_MESSAGE", "i"),
    (SET_JOB_CONF, "SET_JOB_CONF", "A"),
    (SET_INPUT_TYPES, "SET_INPUT_TYPES", "ss"),
    (RUN_MAP, "RUN_MAP", "sii"),
    (MAP_ITEM, "MAP_ITEM", "ss"),
    (RUN_REDUCE, "RUN_REDUCE", "ii"),
    (REDUCE_KEY, "REDUCE_KEY", "s"),
    (REDUCE_VALUE, "REDUCE_VALUE", "s"),
    (CLOSE, "CLOSE", ""),
    (ABORT, "ABORT", ""),
    (AUTHENTICATION_REQ, "AUTHENTICATION_REQ", "ss"),
    (OUTPUT, "OUTPUT", "ss"),
    (PARTITIONED_OUTPUT, "PARTITIONED_OUTPUT", "iss"),
    (STATUS, "STATUS", "s"),
    (PROGRESS, "PROGRESS", "f"),
    (DONE, "DONE", ""),
    (REGISTER_COUNTER, "REGISTER_COUNTER", "iss"),
    (INCREMENT_COUNTER, "INCREMENT_COUNTER", "iL"),
    (AUTHENTICATION_RESP, "AUTHENTICATION_RESP", "s"),
];

/// Returns true for codes the task sends to the host.
pub fn is_upward(code: i32) -> bool {
    code >= UPWARD_START
}
