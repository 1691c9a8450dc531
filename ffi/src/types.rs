//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use todo_sync::{ClientError, ErrorKind, Todo, TodoApp};

/// Opaque handle to a `TodoApp`. C callers receive a pointer to this and
/// pass it back into every FFI function. The handle may be used from
/// several threads at once.
pub struct FfiTodoApp {
    pub(crate) inner: TodoApp,
}

/// Copy `s` into a heap C string. Interior NULs are dropped rather than
/// failing the whole call.
pub(crate) fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s.replace('\0', ""))
        .unwrap_or_default()
        .into_raw()
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiTodoResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Validation = 1,
    Authentication = 2,
    Transport = 3,
    Server = 4,
    Storage = 5,
    Panic = 6,
    NullArg = 7,
}

impl From<ErrorKind> for FfiErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Validation => FfiErrorCode::Validation,
            ErrorKind::Authentication => FfiErrorCode::Authentication,
            ErrorKind::Transport => FfiErrorCode::Transport,
            ErrorKind::Server => FfiErrorCode::Server,
            ErrorKind::Storage => FfiErrorCode::Storage,
        }
    }
}

/// Tag that tells `todo_free_result` what `FfiTodoResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Todo = 1,
    TodoList = 2,
}

/// A single todo item exposed to C.
#[repr(C)]
pub struct FfiTodo {
    pub id: *mut c_char,
    pub title: *mut c_char,
    pub description: *mut c_char,
}

impl FfiTodo {
    fn from_core(todo: &Todo) -> Self {
        FfiTodo {
            id: to_c_string(&todo.id),
            title: to_c_string(&todo.title),
            description: to_c_string(&todo.description),
        }
    }
}

/// A list of todo items exposed to C.
#[repr(C)]
pub struct FfiTodoList {
    pub items: *mut FfiTodo,
    pub len: u32,
}

/// Result envelope for every operation.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is the
/// user-facing C string, `http_status` is the server status or 0, and
/// `data` is null.
#[repr(C)]
pub struct FfiTodoResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiTodoResult {
    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiTodoResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn error(error_code: FfiErrorCode, message: &str, http_status: u16) -> *mut Self {
        Box::into_raw(Box::new(FfiTodoResult {
            error_code,
            error_message: to_c_string(message),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Build a success result carrying a single `FfiTodo`.
    pub(crate) fn ok_todo(todo: &Todo) -> *mut Self {
        let ffi_todo = Box::new(FfiTodo::from_core(todo));
        Self::ok(FfiDataTag::Todo, Box::into_raw(ffi_todo) as *mut c_void)
    }

    /// Build a success result carrying a `FfiTodoList`.
    pub(crate) fn ok_todo_list(todos: &[Todo]) -> *mut Self {
        let len = todos.len() as u32;
        let ffi_todos: Vec<FfiTodo> = todos.iter().map(FfiTodo::from_core).collect();

        let items = if ffi_todos.is_empty() {
            std::ptr::null_mut()
        } else {
            // Boxed slice so capacity == len when it is rebuilt for freeing.
            Box::into_raw(ffi_todos.into_boxed_slice()) as *mut FfiTodo
        };

        let ffi_list = Box::new(FfiTodoList { items, len });
        Self::ok(FfiDataTag::TodoList, Box::into_raw(ffi_list) as *mut c_void)
    }

    /// Build a success result with no data payload (e.g. delete).
    pub(crate) fn ok_empty() -> *mut Self {
        Self::ok(FfiDataTag::None, std::ptr::null_mut())
    }

    /// Build an error result from a `ClientError`.
    pub(crate) fn from_error(err: &ClientError) -> *mut Self {
        Self::error(err.kind.into(), &err.message, err.status.unwrap_or(0))
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, &format!("null argument: {name}"), 0)
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg, 0)
    }
}
