//! Platform abstraction (runtime, clipboard, send-bounds shared by both targets).

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        mod wasm;
        pub use wasm::copy_to_clipboard;

        pub mod runtime_wasm;
        pub use runtime_wasm as runtime;
    } else {
        #[cfg(feature = "native")]
        mod native;
        #[cfg(feature = "native")]
        pub use native::copy_to_clipboard;

        pub mod runtime_native;
        pub use runtime_native as runtime;
    }
}

/// Fallback when the binary was built without a clipboard backend.
#[cfg(all(not(target_arch = "wasm32"), not(feature = "native")))]
pub fn copy_to_clipboard(_content: &str) -> bool {
    false
}

/// `Send` on native, nothing on wasm (browser futures are single-threaded).
#[cfg(not(target_arch = "wasm32"))]
pub trait WasmCompatSend: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + ?Sized> WasmCompatSend for T {}

#[cfg(target_arch = "wasm32")]
pub trait WasmCompatSend {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> WasmCompatSend for T {}

/// `Sync` on native, nothing on wasm.
#[cfg(not(target_arch = "wasm32"))]
pub trait WasmCompatSync: Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Sync + ?Sized> WasmCompatSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait WasmCompatSync {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> WasmCompatSync for T {}
