// #[bridge_interface] expansion
//
// Keeps the trait as written and adds, inside an anonymous const block:
// - one `MethodId` constant per method
// - the static `InterfaceDescriptor` and `impl Interface for dyn Trait`;
//   supertraits that are themselves bridge interfaces become its parents
// - `impl Trait for BridgeProxy`, forwarding every method through the bridge
// - for methods with a default body, a trampoline that runs that body with
//   the proxy as receiver (registered as the method's fallback)

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    ItemTrait, LitStr, Result, TraitBound, TraitBoundModifier, TraitItem, TraitItemFn,
    TypeParamBound,
};

use crate::signature::{parse_method, ArgKind, MethodSig, ReturnKind};

/// Arguments of `#[bridge_interface(...)]`
#[derive(Default)]
pub struct InterfaceArgs {
    /// Interface name reported to the foreign side; defaults to the trait name
    pub name: Option<LitStr>,
}

impl InterfaceArgs {
    pub fn parse_meta(&mut self, meta: syn::meta::ParseNestedMeta) -> Result<()> {
        if meta.path.is_ident("name") {
            self.name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported bridge_interface argument, expected `name = \"...\"`"))
        }
    }
}

struct Method<'a> {
    sig: MethodSig,
    item: &'a TraitItemFn,
}

impl Method<'_> {
    fn id_const(&self) -> syn::Ident {
        format_ident!("__PROXYBRIDGE_ID_{}", self.sig.ident)
    }

    fn trampoline(&self) -> syn::Ident {
        format_ident!("__proxybridge_default_{}", self.sig.ident)
    }

    fn default_fn(&self) -> syn::Ident {
        format_ident!("__default_{}", self.sig.ident)
    }

    fn has_default(&self) -> bool {
        self.item.default.is_some()
    }
}

/// Expands the #[bridge_interface] attribute macro.
pub fn expand_interface(args: InterfaceArgs, item: ItemTrait) -> Result<TokenStream> {
    validate_trait(&item)?;

    let trait_ident = &item.ident;
    let interface_name = args
        .name
        .map(|name| name.value())
        .unwrap_or_else(|| trait_ident.to_string());

    let mut methods = Vec::new();
    for trait_item in &item.items {
        match trait_item {
            TraitItem::Fn(method) => methods.push(Method {
                sig: parse_method(method)?,
                item: method,
            }),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "bridge interfaces may only declare methods",
                ))
            }
        }
    }

    let method_count = methods.len();
    let id_consts = methods.iter().map(|m| {
        let id = m.id_const();
        let name = m.sig.ident.to_string();
        let signature = &m.sig.signature;
        quote! {
            #[allow(non_upper_case_globals)]
            const #id: ::proxybridge::MethodId =
                ::proxybridge::MethodId::new(#interface_name, #name, #signature);
        }
    });

    let descriptors = methods.iter().map(|m| {
        let id = m.id_const();
        let arity = m.sig.args.len();
        let returns = m.sig.value_type();
        let default = if m.has_default() {
            let trampoline = m.trampoline();
            quote! { ::std::option::Option::Some(#trampoline) }
        } else {
            quote! { ::std::option::Option::None }
        };
        quote! {
            ::proxybridge::MethodDescriptor {
                id: #id,
                arity: #arity,
                returns: #returns,
                default: #default,
            }
        }
    });

    let parents = parent_bounds(&item);
    let parent_fns: Vec<syn::Ident> = (0..parents.len())
        .map(|i| format_ident!("__proxybridge_parent_{}", i))
        .collect();
    let parent_defs = parents.iter().zip(&parent_fns).map(|(bound, name)| {
        let path = &bound.path;
        quote! {
            fn #name() -> &'static ::proxybridge::InterfaceDescriptor {
                <dyn #path as ::proxybridge::Interface>::descriptor()
            }
        }
    });

    let forwarders = methods.iter().map(forwarder);

    let defaults_trait = format_ident!("__{}BridgeDefaults", trait_ident);
    let with_defaults: Vec<&Method> = methods.iter().filter(|m| m.has_default()).collect();
    let defaults = if with_defaults.is_empty() {
        quote! {}
    } else {
        let bodies = with_defaults.iter().map(|m| {
            let default_fn = m.default_fn();
            let inputs = &m.item.sig.inputs;
            let output = &m.item.sig.output;
            let body = &m.item.default;
            quote! { fn #default_fn(#inputs) #output #body }
        });
        let trampolines = with_defaults
            .iter()
            .map(|m| trampoline(m, &defaults_trait));
        quote! {
            #[allow(non_camel_case_types)]
            trait #defaults_trait: #trait_ident {
                #(#bodies)*
            }

            impl #defaults_trait for ::proxybridge::BridgeProxy {}

            #(#trampolines)*
        }
    };

    Ok(quote! {
        #item

        const _: () = {
            #(#id_consts)*

            #(#parent_defs)*

            static __PROXYBRIDGE_METHODS: [::proxybridge::MethodDescriptor; #method_count] = [
                #(#descriptors),*
            ];

            static __PROXYBRIDGE_INTERFACE: ::proxybridge::InterfaceDescriptor =
                ::proxybridge::InterfaceDescriptor {
                    name: #interface_name,
                    methods: &__PROXYBRIDGE_METHODS,
                    parents: &[#(#parent_fns),*],
                };

            impl ::proxybridge::Interface for dyn #trait_ident {
                fn descriptor() -> &'static ::proxybridge::InterfaceDescriptor {
                    &__PROXYBRIDGE_INTERFACE
                }
            }

            impl #trait_ident for ::proxybridge::BridgeProxy {
                #(#forwarders)*
            }

            #defaults
        };
    })
}

fn validate_trait(item: &ItemTrait) -> Result<()> {
    if !item.generics.params.is_empty() || item.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "generic traits are not supported in #[bridge_interface]",
        ));
    }
    if let Some(unsafety) = &item.unsafety {
        return Err(syn::Error::new_spanned(
            unsafety,
            "unsafe traits are not supported in #[bridge_interface]",
        ));
    }
    Ok(())
}

/// Supertraits other than auto and marker traits. Each must be a bridge interface.
fn parent_bounds(item: &ItemTrait) -> Vec<&TraitBound> {
    const MARKERS: [&str; 4] = ["Send", "Sync", "Unpin", "Sized"];
    item.supertraits
        .iter()
        .filter_map(|bound| match bound {
            TypeParamBound::Trait(bound) if matches!(bound.modifier, TraitBoundModifier::None) => {
                Some(bound)
            }
            _ => None,
        })
        .filter(|bound| {
            bound
                .path
                .segments
                .last()
                .map_or(true, |segment| !MARKERS.iter().any(|m| segment.ident == m))
        })
        .collect()
}

/// `impl Trait for BridgeProxy` method: convert, call, complete.
fn forwarder(method: &Method) -> TokenStream {
    let ident = &method.sig.ident;
    let id = method.id_const();
    let output = &method.item.sig.output;
    let arg_count = method.sig.args.len();

    let params = method.sig.args.iter().enumerate().map(|(i, arg)| {
        let name = format_ident!("__arg{}", i);
        let ty = &arg.ty;
        quote! { #name: #ty }
    });
    let values = method.sig.args.iter().enumerate().map(|(i, arg)| {
        let name = format_ident!("__arg{}", i);
        match arg.kind {
            ArgKind::Owned => quote! { ::proxybridge::IntoValue::into_value(#name) },
            ArgKind::Borrowed => quote! {
                ::proxybridge::IntoValue::into_value(::std::borrow::ToOwned::to_owned(#name))
            },
        }
    });

    let complete = match method.sig.ret {
        ReturnKind::Result { .. } => quote! {
            ::proxybridge::__private::finish_result(self.call(&#id, &__args))
        },
        ReturnKind::Unit | ReturnKind::Plain(_) => quote! {
            ::proxybridge::__private::finish(&#id, self.call(&#id, &__args))
        },
    };

    quote! {
        fn #ident(&self, #(#params),*) #output {
            let __args: [::proxybridge::Value; #arg_count] = [#(#values),*];
            #complete
        }
    }
}

/// Default body adapter matching `DefaultMethod`.
fn trampoline(method: &Method, defaults_trait: &syn::Ident) -> TokenStream {
    let id = method.id_const();
    let name = method.trampoline();
    let default_fn = method.default_fn();
    let arg_count = method.sig.args.len();

    let bound: Vec<syn::Ident> = (0..arg_count).map(|i| format_ident!("__value{}", i)).collect();
    let converted = method.sig.args.iter().enumerate().map(|(i, arg)| {
        let name = format_ident!("__arg{}", i);
        let value = &bound[i];
        let target = &arg.target;
        match arg.kind {
            ArgKind::Owned => quote! {
                let #name: #target = ::proxybridge::__private::arg(&#id, #value)?;
            },
            ArgKind::Borrowed => quote! {
                let #name: <#target as ::std::borrow::ToOwned>::Owned =
                    ::proxybridge::__private::arg(&#id, #value)?;
            },
        }
    });
    let call_args = method.sig.args.iter().enumerate().map(|(i, arg)| {
        let name = format_ident!("__arg{}", i);
        match arg.kind {
            ArgKind::Owned => quote! { #name },
            ArgKind::Borrowed => quote! { &#name },
        }
    });

    let call = quote! {
        <::proxybridge::BridgeProxy as #defaults_trait>::#default_fn(proxy, #(#call_args),*)
    };
    let wrap = match method.sig.ret {
        ReturnKind::Result { .. } => quote! { ::proxybridge::__private::ret_result(#call) },
        ReturnKind::Unit | ReturnKind::Plain(_) => quote! { ::proxybridge::__private::ret(#call) },
    };

    quote! {
        fn #name(
            proxy: &::proxybridge::BridgeProxy,
            args: &[::proxybridge::Value],
        ) -> ::proxybridge::BridgeResult<::proxybridge::Value> {
            let [#(#bound),*] = #id.bind::<#arg_count>(args)?;
            #(#converted)*
            #wrap
        }
    }
}
