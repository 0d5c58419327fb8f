//! Derive macros for courier. `#[derive(Command)]`, `#[derive(Query)]` and `#[derive(Inject)]`
//! replace the marker impls and constructor-injection boilerplate.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Type};

/// Implements `courier::Command`, or `courier::CommandWithResult` when `#[command(result = T)]` is given.
///
/// ```ignore
/// #[derive(Command)]
/// #[command(result = u64)]
/// struct CreateUser { name: String }
/// ```
#[proc_macro_derive(Command, attributes(command))]
pub fn derive_command(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let expanded = match result_type(&input.attrs, "command") {
        Ok(Some(result)) => quote! {
            impl #impl_generics ::courier::CommandWithResult for #name #ty_generics #where_clause {
                type Result = #result;
            }
        },
        Ok(None) => quote! {
            impl #impl_generics ::courier::Command for #name #ty_generics #where_clause {}
        },
        Err(err) => err.to_compile_error(),
    };
    TokenStream::from(expanded)
}

/// Implements `courier::Query`. Requires `#[query(result = T)]`.
#[proc_macro_derive(Query, attributes(query))]
pub fn derive_query(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let expanded = match result_type(&input.attrs, "query") {
        Ok(Some(result)) => quote! {
            impl #impl_generics ::courier::Query for #name #ty_generics #where_clause {
                type Result = #result;
            }
        },
        Ok(None) => syn::Error::new_spanned(name, "missing #[query(result = T)]").to_compile_error(),
        Err(err) => err.to_compile_error(),
    };
    TokenStream::from(expanded)
}

/// Implements `courier::Inject`: every field is resolved from the scope.
///
/// Fields are `Arc<T>` services by default. `#[inject(all)]` resolves every registration into a
/// `Vec<Arc<T>>`; `#[inject(default)]` uses `Default::default()` instead of the container.
#[proc_macro_derive(Inject, attributes(inject))]
pub fn derive_inject(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return syn::Error::new_spanned(name, "Inject can only be derived for structs")
                .to_compile_error()
                .into()
        }
    };

    let body = match inject_fields(fields) {
        Ok(body) => body,
        Err(err) => return err.to_compile_error().into(),
    };

    let expanded = quote! {
        impl #impl_generics ::courier::Inject for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn inject(scope: &::courier::Scope) -> ::core::result::Result<Self, ::courier::ContainerError> {
                ::core::result::Result::Ok(Self #body)
            }
        }
    };
    TokenStream::from(expanded)
}

enum Source {
    One,
    All,
    Default,
}

fn inject_fields(fields: &Fields) -> syn::Result<TokenStream2> {
    match fields {
        Fields::Unit => Ok(quote! {}),
        Fields::Named(named) => {
            let inits = named
                .named
                .iter()
                .map(|field| {
                    let ident = &field.ident;
                    let value = resolve_expr(source(&field.attrs)?);
                    Ok(quote! { #ident: #value })
                })
                .collect::<syn::Result<Vec<_>>>()?;
            Ok(quote! { { #(#inits),* } })
        }
        Fields::Unnamed(unnamed) => {
            let inits = unnamed
                .unnamed
                .iter()
                .map(|field| Ok(resolve_expr(source(&field.attrs)?)))
                .collect::<syn::Result<Vec<_>>>()?;
            Ok(quote! { ( #(#inits),* ) })
        }
    }
}

fn resolve_expr(source: Source) -> TokenStream2 {
    match source {
        Source::One => quote! { scope.resolve()? },
        Source::All => quote! { scope.resolve_all()? },
        Source::Default => quote! { ::core::default::Default::default() },
    }
}

fn source(attrs: &[Attribute]) -> syn::Result<Source> {
    let mut source = Source::One;
    for attr in attrs.iter().filter(|a| a.path().is_ident("inject")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("all") {
                source = Source::All;
                Ok(())
            } else if meta.path.is_ident("default") {
                source = Source::Default;
                Ok(())
            } else {
                Err(meta.error("expected `all` or `default`"))
            }
        })?;
    }
    Ok(source)
}

fn result_type(attrs: &[Attribute], name: &str) -> syn::Result<Option<Type>> {
    let mut result = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident(name)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("result") {
                result = Some(meta.value()?.parse::<Type>()?);
                Ok(())
            } else {
                Err(meta.error("expected `result = T`"))
            }
        })?;
    }
    Ok(result)
}
