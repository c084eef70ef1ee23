//! Generates foreign-language bindings for the MobilityKit libraries.

fn main() {
    uniffi::uniffi_bindgen_main();
}
