//! Procedural macros for zenstore target definitions.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{FnArg, ItemFn, LitStr, Pat, Path, Type, parse_macro_input};

const RESERVED_NAMES: &[&str] = &["_target_", "_partial_", "_args_", "_recursive_", "_convert_"];
const RESERVED_PREFIXES: &[&str] = &["hydra_", "zen_", "_zen_"];

/// Turns a free function into a registrable target.
///
/// The function is emitted unchanged. Next to it the attribute generates
/// `fn <name>_target() -> FnTarget` whose declared name is the function's
/// name and whose signature lists the function's parameters in order.
/// Parameters of type `Option<_>` default to `null`; all others are
/// required. Parameter types must implement `DeserializeOwned` and the
/// return type `Serialize`. Parameter names reserved for config bookkeeping
/// (`_target_`, `zen_*`, `hydra_*` and the like) are rejected.
///
/// `#[target(crate = "path::to::builds")]` overrides the path used to reach
/// `zenstore-builds` (default `::zenstore_builds`).
#[proc_macro_attribute]
pub fn target(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut krate: Path = syn::parse_quote!(::zenstore_builds);
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("crate") {
            let lit: LitStr = meta.value()?.parse()?;
            krate = lit.parse()?;
            Ok(())
        } else {
            Err(meta.error("unsupported `target` argument"))
        }
    });
    parse_macro_input!(attr with parser);

    let function = parse_macro_input!(item as ItemFn);
    expand(&krate, &function)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(krate: &Path, function: &ItemFn) -> syn::Result<TokenStream2> {
    let sig = &function.sig;
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "`#[target]` functions cannot be generic",
        ));
    }
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(asyncness, "`#[target]` functions must be synchronous"));
    }

    let mut names = Vec::new();
    let mut types = Vec::new();
    for input in &sig.inputs {
        match input {
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new_spanned(
                    receiver,
                    "`#[target]` cannot be applied to methods",
                ));
            }
            FnArg::Typed(typed) => {
                let Pat::Ident(pat) = typed.pat.as_ref() else {
                    return Err(syn::Error::new_spanned(
                        &typed.pat,
                        "`#[target]` parameters must be plain identifiers",
                    ));
                };
                let key = pat.ident.to_string();
                if is_reserved(key.trim_start_matches("r#")) {
                    return Err(syn::Error::new_spanned(
                        &pat.ident,
                        format!("`{key}` is reserved and cannot be a `#[target]` parameter"),
                    ));
                }
                names.push(pat.ident.clone());
                types.push(typed.ty.as_ref().clone());
            }
        }
    }

    let ident = &sig.ident;
    let vis = &function.vis;
    let constructor = format_ident!("{}_target", ident);
    let arguments = syn::Ident::new("__zen_arguments", Span::mixed_site());

    let params = names.iter().zip(&types).map(|(name, ty)| {
        let key = name.to_string();
        if is_option(ty) {
            quote! { .param_with_default(#key, #krate::__private::Value::Null) }
        } else {
            quote! { .param(#key) }
        }
    });
    let takes = names.iter().zip(&types).map(|(name, ty)| {
        let key = name.to_string();
        quote! {
            let #name: #ty = #krate::__private::take_argument(&mut #arguments, #key)?;
        }
    });
    let doc = format!("Registration target for [`{ident}`].");

    Ok(quote! {
        #function

        #[doc = #doc]
        #[allow(unused_mut)]
        #vis fn #constructor() -> #krate::FnTarget {
            #krate::FnTarget::new(
                stringify!(#ident),
                #krate::Signature::new() #(#params)*,
                |mut #arguments: #krate::Fields| -> #krate::BuildsResult<#krate::__private::Value> {
                    #(#takes)*
                    #krate::__private::to_output(#ident(#(#names),*))
                },
            )
            .with_path(concat!(module_path!(), "::", stringify!(#ident)))
        }
    })
}

fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name) || RESERVED_PREFIXES.iter().any(|p| name.starts_with(p))
}

fn is_option(ty: &Type) -> bool {
    match ty {
        Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Option"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn krate() -> Path {
        syn::parse_quote!(::zenstore_builds)
    }

    #[test]
    fn expands_plain_functions() {
        let function: ItemFn = syn::parse_quote! {
            fn pair(a: i64, b: Option<i64>) -> (i64, i64) { (a, b.unwrap_or(0)) }
        };
        let tokens = expand(&krate(), &function).expect("expand").to_string();
        assert!(tokens.contains("pair_target"));
        assert!(tokens.contains("param_with_default"));
    }

    #[test]
    fn rejects_reserved_parameter_names() {
        let functions: [ItemFn; 3] = [
            syn::parse_quote! { fn f(zen_seed: i64) {} },
            syn::parse_quote! { fn f(a: i64, hydra_mode: String) {} },
            syn::parse_quote! { fn f(_target_: String) {} },
        ];
        for function in functions {
            let err = expand(&krate(), &function).expect_err("reserved parameter");
            assert!(err.to_string().contains("is reserved"));
        }
    }

    #[test]
    fn rejects_generic_functions() {
        let function: ItemFn = syn::parse_quote! { fn f<T>(value: T) {} };
        let err = expand(&krate(), &function).expect_err("generic");
        assert!(err.to_string().contains("cannot be generic"));
    }
}
