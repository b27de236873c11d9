use std::process::ExitCode;

pub const SUCCESS: u8 = 0;
/// One or more items failed, or the run could not be carried out.
pub const FAILURE: u8 = 1;
pub const USAGE: u8 = 5;
/// 128 + SIGINT, the shell convention for an interrupted command.
pub const INTERRUPTED: u8 = 130;

#[inline]
pub fn code(status: u8) -> ExitCode {
    ExitCode::from(status)
}
