//! Logging macros
//!
//! Each macro takes a message followed by optional `"key" => value` fields;
//! values are anything `Display`. `log_error!` also accepts `at = path` for
//! the token path the error concerns.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_fields {
    ($($key:expr => $value:expr),*) => {
        vec![$(($key, ::std::string::ToString::to_string(&$value))),*]
    };
}

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, at = $path:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::emit_error(
            $code,
            $message,
            Some(::std::string::ToString::to_string(&$path)),
            $crate::__log_fields!($($key => $value),*),
        )
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::emit_error($code, $message, None, $crate::__log_fields!($($key => $value),*))
    };
}

/// Warning, with a registered `W` code when one applies
#[macro_export]
macro_rules! log_warning {
    (code = $code:expr, $message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::emit_warning(Some($code), $message, $crate::__log_fields!($($key => $value),*))
    };

    ($message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::emit_warning(None, $message, $crate::__log_fields!($($key => $value),*))
    };
}

/// Stage completion with an `I` code
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::success($code, $message),
            $crate::__log_fields!($($key => $value),*),
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::info($message),
            $crate::__log_fields!($($key => $value),*),
        )
    };
}

/// Fields are not formatted unless debug output is enabled
#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)*) => {
        if $crate::logging::config::enabled($crate::logging::LogLevel::Debug) {
            $crate::logging::emit(
                $crate::logging::LogEvent::debug($message),
                $crate::__log_fields!($($key => $value),*),
            )
        }
    };
}

/// `log_success!` with a `duration_ms` field when performance events are on
#[macro_export]
macro_rules! log_performance {
    ($code:expr, $message:expr, duration = $duration:expr $(, $key:expr => $value:expr)*) => {{
        let mut fields = $crate::__log_fields!($($key => $value),*);
        if $crate::logging::config::preferences().log_performance_events {
            fields.insert(0, ("duration_ms", format!("{:.3}", $duration.as_secs_f64() * 1000.0)));
        }
        $crate::logging::emit($crate::logging::LogEvent::success($code, $message), fields)
    }};
}
