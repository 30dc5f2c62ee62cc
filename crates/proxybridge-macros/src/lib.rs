// proxybridge-macros: derive bridge glue from interface traits
//
// Provides one attribute:
// - #[bridge_interface] - makes `BridgeProxy` implement a trait by forwarding
//   every method to the foreign side
//
// Example:
// ```
// use proxybridge::bridge_interface;
//
// #[bridge_interface(name = "java.util.Iterator")]
// pub trait Iterator {
//     fn has_next(&self) -> bool;
//     fn next(&self) -> Value;
//     fn remove(&self) -> Result<(), BridgeError> {
//         Err(ForeignException::new("UnsupportedOperation", "remove").into())
//     }
// }
// ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemTrait};

mod interface;
mod signature;

/// Turns a trait into a bridge interface.
///
/// Generates:
/// - `impl Interface for dyn Trait`, so the trait can be named in an
///   `InterfaceContract`
/// - `impl Trait for BridgeProxy`: each method converts its arguments to
///   `Value`s and calls the foreign side
/// - a fallback for every method that has a default body, run with the
///   proxy as receiver when the foreign side does not implement the method
///
/// Methods must take `&self`, have no generics and use types implementing
/// `IntoValue` (parameters) and `FromValue + Default` (return values).
/// Parameters passed by `&T` cross the bridge as `T::Owned`.
///
/// Return types are strict: a foreign `null` only converts to `Option<T>`
/// (as `None`) or to `()`. A method whose foreign implementation may return
/// `null` must be declared with an `Option` return, otherwise the call fails
/// with `BridgeError::TypeMismatch`.
///
/// A method returning `Result<T, E>` reports bridge failures through `E`,
/// which needs `E: From<BridgeError>`. If the method also has a default
/// body, the body's errors go back through the bridge, so `E` must be
/// `Into<BridgeError>` as well. Any other method panics if the call fails;
/// a disabled proxy never fails and yields `Default::default()`.
///
/// Supertraits other than `Send`, `Sync`, `Unpin` and `Sized` must be bridge
/// interfaces themselves. `InterfaceContract::of::<dyn Trait>()` then
/// includes them, so a proxy for the trait also answers every inherited
/// method.
///
/// # Example
///
/// ```ignore
/// #[bridge_interface]
/// pub trait Runnable {
///     fn run(&self);
/// }
///
/// let proxy = bridge.create_proxy(handle, &InterfaceContract::of::<dyn Runnable>())?;
/// proxy.run();
/// ```
#[proc_macro_attribute]
pub fn bridge_interface(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = interface::InterfaceArgs::default();
    let parser = syn::meta::parser(|meta| args.parse_meta(meta));
    parse_macro_input!(attr with parser);

    let input = parse_macro_input!(item as ItemTrait);
    interface::expand_interface(args, input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
