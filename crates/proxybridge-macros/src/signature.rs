// Method signature analysis for #[bridge_interface]
//
// Classifies parameters and return types so the expansion knows how to move
// each value across the bridge.

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{
    spanned::Spanned, FnArg, GenericArgument, PathArguments, ReturnType, TraitItemFn, Type,
};

/// How a parameter is passed
pub enum ArgKind {
    /// By value: converted with `IntoValue` / `FromValue`
    Owned,
    /// By shared reference: converted through `ToOwned::Owned`
    Borrowed,
}

/// One non-receiver parameter
pub struct MethodArg {
    /// Declared type (for borrowed arguments, the full `&T`)
    pub ty: Type,
    /// Referent type for borrowed arguments
    pub target: Type,
    pub kind: ArgKind,
}

/// Declared return type
pub enum ReturnKind {
    Unit,
    Plain(Type),
    /// `Result<T, E>`; errors are reported through `E`
    Result { ok: Type },
}

/// Parsed trait method
pub struct MethodSig {
    pub ident: syn::Ident,
    pub args: Vec<MethodArg>,
    pub ret: ReturnKind,
    /// Human-readable signature used in the method identity
    pub signature: String,
}

impl MethodSig {
    /// Tokens evaluating to the method's `ValueType`
    pub fn value_type(&self) -> TokenStream {
        match &self.ret {
            ReturnKind::Unit => quote! { ::proxybridge::ValueType::Void },
            ReturnKind::Plain(ty) | ReturnKind::Result { ok: ty } => {
                quote! { <#ty as ::proxybridge::FromValue>::VALUE_TYPE }
            }
        }
    }
}

/// Parse and validate a trait method
pub fn parse_method(method: &TraitItemFn) -> syn::Result<MethodSig> {
    let sig = &method.sig;

    if sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(
            sig.asyncness,
            "async methods are not supported in #[bridge_interface]",
        ));
    }
    if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "generic methods are not supported in #[bridge_interface]",
        ));
    }
    if let Some(variadic) = &sig.variadic {
        return Err(syn::Error::new_spanned(variadic, "variadic methods are not supported"));
    }

    let mut inputs = sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some()
                && receiver.mutability.is_none()
                && receiver.colon_token.is_none() => {}
        _ => {
            return Err(syn::Error::new(
                sig.span(),
                "bridge interface methods must take `&self`",
            ))
        }
    }

    let mut args = Vec::new();
    for input in inputs {
        let FnArg::Typed(pat_type) = input else {
            return Err(syn::Error::new_spanned(input, "unexpected receiver"));
        };
        args.push(parse_arg(&pat_type.ty)?);
    }

    let ret = match &sig.output {
        ReturnType::Default => ReturnKind::Unit,
        ReturnType::Type(_, ty) => parse_return(ty)?,
    };

    let params: Vec<String> = args.iter().map(|arg| type_string(&arg.ty)).collect();
    let mut signature = format!("({})", params.join(", "));
    if let ReturnType::Type(_, ty) = &sig.output {
        signature.push_str(" -> ");
        signature.push_str(&type_string(ty));
    }

    Ok(MethodSig {
        ident: sig.ident.clone(),
        args,
        ret,
        signature,
    })
}

fn parse_arg(ty: &Type) -> syn::Result<MethodArg> {
    match ty {
        Type::Reference(reference) if reference.mutability.is_some() => Err(syn::Error::new_spanned(
            ty,
            "`&mut` parameters cannot cross the bridge",
        )),
        Type::Reference(reference) => Ok(MethodArg {
            ty: ty.clone(),
            target: (*reference.elem).clone(),
            kind: ArgKind::Borrowed,
        }),
        Type::ImplTrait(_) => Err(syn::Error::new_spanned(
            ty,
            "`impl Trait` parameters are not supported",
        )),
        _ => Ok(MethodArg {
            ty: ty.clone(),
            target: ty.clone(),
            kind: ArgKind::Owned,
        }),
    }
}

fn parse_return(ty: &Type) -> syn::Result<ReturnKind> {
    match ty {
        Type::Tuple(tuple) if tuple.elems.is_empty() => Ok(ReturnKind::Unit),
        Type::Reference(_) => Err(syn::Error::new_spanned(
            ty,
            "bridge interface methods must return owned values",
        )),
        Type::ImplTrait(_) => Err(syn::Error::new_spanned(
            ty,
            "`impl Trait` return types are not supported",
        )),
        _ => Ok(match result_ok_type(ty) {
            Some(ok) => ReturnKind::Result { ok },
            None => ReturnKind::Plain(ty.clone()),
        }),
    }
}

/// `T` for `Result<T, E>` and `BridgeResult<T>`
fn result_ok_type(ty: &Type) -> Option<Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Result" && segment.ident != "BridgeResult" {
        return None;
    }
    let PathArguments::AngleBracketed(generics) = &segment.arguments else {
        return None;
    };
    match generics.args.first()? {
        GenericArgument::Type(ok) => Some(ok.clone()),
        _ => None,
    }
}

/// Render a type compactly: `Vec<String>`, `&str`, `Option<&'static str>`
pub fn type_string(ty: &Type) -> String {
    let raw = ty.to_token_stream().to_string();
    let mut out = String::with_capacity(raw.len());
    let chars: Vec<char> = raw.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = out.chars().last();
            let next = chars.get(i + 1).copied();
            let word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
            if word(prev) && (word(next) || next == Some('\'')) || prev == Some(',') {
                out.push(' ');
            }
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_type_string() {
        let cases: Vec<(Type, &str)> = vec![
            (parse_quote!(i32), "i32"),
            (parse_quote!(&str), "&str"),
            (parse_quote!(Vec<String>), "Vec<String>"),
            (parse_quote!(Result<i32, MyError>), "Result<i32, MyError>"),
            (parse_quote!(&'static str), "&'static str"),
            (parse_quote!(std::option::Option<f64>), "std::option::Option<f64>"),
        ];
        for (ty, expected) in cases {
            assert_eq!(type_string(&ty), expected);
        }
    }

    #[test]
    fn test_parse_simple_method() {
        let method: TraitItemFn = parse_quote! {
            fn greet(&self, name: &str, times: i32) -> String;
        };
        let sig = parse_method(&method).unwrap();
        assert_eq!(sig.ident, "greet");
        assert_eq!(sig.args.len(), 2);
        assert!(matches!(sig.args[0].kind, ArgKind::Borrowed));
        assert!(matches!(sig.args[1].kind, ArgKind::Owned));
        assert!(matches!(sig.ret, ReturnKind::Plain(_)));
        assert_eq!(sig.signature, "(&str, i32) -> String");
    }

    #[test]
    fn test_parse_unit_and_result_returns() {
        let run: TraitItemFn = parse_quote! { fn run(&self); };
        let sig = parse_method(&run).unwrap();
        assert!(matches!(sig.ret, ReturnKind::Unit));
        assert_eq!(sig.signature, "()");

        let next: TraitItemFn = parse_quote! {
            fn next(&self) -> Result<Value, BridgeError>;
        };
        let sig = parse_method(&next).unwrap();
        match sig.ret {
            ReturnKind::Result { ok } => assert_eq!(type_string(&ok), "Value"),
            _ => panic!("expected a Result return"),
        }
    }

    #[test]
    fn test_rejects_unsupported_methods() {
        let methods: Vec<TraitItemFn> = vec![
            parse_quote! { fn take(self); },
            parse_quote! { fn poke(&mut self); },
            parse_quote! { fn make() -> i32; },
            parse_quote! { fn map<T>(&self, value: T) -> T; },
            parse_quote! { async fn wait(&self); },
            parse_quote! { fn fill(&self, buf: &mut Vec<u8>); },
            parse_quote! { fn name(&self) -> &str; },
        ];
        for method in methods {
            assert!(parse_method(&method).is_err(), "{}", method.sig.ident);
        }
    }
}
