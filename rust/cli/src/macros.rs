/// `writeln!` to a stream inside [`crate::run`]; a failed write ends the
/// process with [`crate::exit_code::ERROR`].
#[macro_export]
macro_rules! write_or_exit {
    ($dest:expr, $($arg:tt)*) => {
        if writeln!($dest, $($arg)*).is_err() {
            return $crate::exit_code::ERROR;
        }
    };
}
