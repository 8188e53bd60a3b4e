//! In-process binding to the native Self library
//!
//! Loads the shared library at runtime and resolves three C entry points.
//! These are the shim's own interface; the library has to export them:
//!
//! ```c
//! int self_start(int argc, const char **argv);
//! int self_is_running(void);
//! int self_stop(void);
//! ```

use std::ffi::{c_char, c_int, CString};
use std::path::Path;

use libloading::Library;
use tracing::{debug, info, warn};

use crate::binding::NativeBinding;
use crate::error::BindingError;

type StartFn = unsafe extern "C" fn(c_int, *const *const c_char) -> c_int;
type StatusFn = unsafe extern "C" fn() -> c_int;

const START_SYMBOL: &[u8] = b"self_start\0";
const IS_RUNNING_SYMBOL: &[u8] = b"self_is_running\0";
const STOP_SYMBOL: &[u8] = b"self_stop\0";

/// Status returned when the arguments cannot be handed to C
const START_REJECTED: i32 = 1;

/// Resolved entry points and the argv marshalling around them
struct EntryPoints {
    start: StartFn,
    is_running: StatusFn,
    stop: StatusFn,
}

impl EntryPoints {
    fn is_running(&self) -> i32 {
        // SAFETY: points at a C function with the `StatusFn` prototype.
        unsafe { (self.is_running)() }
    }

    fn start(&self, args: &[String]) -> i32 {
        let Some(c_args) = marshal_args(args) else {
            return START_REJECTED;
        };

        let argv: Vec<*const c_char> = c_args.iter().map(|arg| arg.as_ptr()).collect();
        let argc = match c_int::try_from(argv.len()) {
            Ok(argc) => argc,
            Err(_) => return START_REJECTED,
        };

        // SAFETY: argv points into c_args, which outlives the call. The
        // callee copies the strings before returning.
        unsafe { (self.start)(argc, argv.as_ptr()) }
    }

    fn stop(&self) -> i32 {
        // SAFETY: points at a C function with the `StatusFn` prototype.
        unsafe { (self.stop)() }
    }
}

/// Convert launch arguments to C strings, rejecting interior NUL bytes
fn marshal_args(args: &[String]) -> Option<Vec<CString>> {
    match args
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(c_args) => Some(c_args),
        Err(e) => {
            warn!("Launch argument contains an interior NUL byte: {}", e);
            None
        }
    }
}

/// Binding backed by a dynamically loaded shared library
pub struct LibraryBinding {
    entry: EntryPoints,
    // Keeps the function pointers in `entry` valid; must outlive them.
    _library: Library,
}

impl LibraryBinding {
    /// Load a library by name or path
    ///
    /// A bare name such as `self_android` is expanded to the platform file
    /// name (`libself_android.so` on Linux and Android). Paths and names that
    /// already carry a `.so` suffix (`libfoo.so.1`) go to the loader as given.
    pub fn open(name: &str) -> Result<Self, BindingError> {
        let file_name = if name.contains(std::path::MAIN_SEPARATOR) || name.contains(".so") {
            Path::new(name).as_os_str().to_owned()
        } else {
            libloading::library_filename(name)
        };

        info!("Loading native library {:?}", file_name);

        // SAFETY: loading runs the library's initialisers; the Self library
        // has no constructors that depend on caller state.
        let library = unsafe { Library::new(&file_name) }.map_err(|e| {
            warn!("Failed to load native library {}: {}", name, e);
            BindingError::LibraryLoad {
                library: name.to_string(),
                reason: e.to_string(),
            }
        })?;

        let entry = EntryPoints {
            start: resolve::<StartFn>(&library, name, START_SYMBOL)?,
            is_running: resolve::<StatusFn>(&library, name, IS_RUNNING_SYMBOL)?,
            stop: resolve::<StatusFn>(&library, name, STOP_SYMBOL)?,
        };

        debug!("Resolved native entry points in {}", name);

        Ok(Self {
            entry,
            _library: library,
        })
    }
}

fn resolve<T: Copy>(library: &Library, name: &str, symbol: &[u8]) -> Result<T, BindingError> {
    // SAFETY: the type aliases above match the exported C prototypes.
    unsafe { library.get::<T>(symbol) }
        .map(|sym| *sym)
        .map_err(|_| BindingError::MissingSymbol {
            library: name.to_string(),
            symbol: String::from_utf8_lossy(&symbol[..symbol.len() - 1]).to_string(),
        })
}

impl NativeBinding for LibraryBinding {
    fn is_running(&mut self) -> i32 {
        self.entry.is_running()
    }

    fn start(&mut self, args: &[String]) -> i32 {
        self.entry.start(args)
    }

    fn stop(&mut self) -> i32 {
        self.entry.stop()
    }
}
