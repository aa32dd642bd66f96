use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{Ident, Item, Path, Token, parse_macro_input};

/// Arguments of `#[export(...)]`.
struct ExportArgs {
    /// Path to the core crate, `::talon::core` unless overridden.
    core: Path,
}

impl Parse for ExportArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut core: Path = syn::parse_quote!(::talon::core);

        while !input.is_empty() {
            let key: Ident = if input.peek(Token![crate]) {
                let kw: Token![crate] = input.parse()?;
                Ident::new("crate", kw.span)
            } else {
                input.parse()?
            };
            input.parse::<Token![=]>()?;

            match key.to_string().as_str() {
                "crate" => core = input.parse()?,
                other => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("unknown argument `{other}`, expected `crate`"),
                    ));
                }
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(Self { core })
    }
}

/// Implementation of the `#[export]` attribute macro.
///
/// Leaves the decorated type unchanged and appends a
/// `#[linkme::distributed_slice]` static that records it in the export
/// manifest of `talon-core`.
pub fn export(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ExportArgs);
    let item = parse_macro_input!(item as Item);

    let (ident, generics) = match &item {
        Item::Struct(s) => (&s.ident, &s.generics),
        Item::Enum(e) => (&e.ident, &e.generics),
        Item::Union(u) => (&u.ident, &u.generics),
        other => {
            return syn::Error::new_spanned(other, "`#[export]` applies to structs, enums and unions")
                .into_compile_error()
                .into();
        }
    };

    if !generics.params.is_empty() {
        return syn::Error::new_spanned(generics, "exported types cannot be generic")
            .into_compile_error()
            .into();
    }

    let core = &args.core;
    let name = ident.to_string();
    let static_name = Ident::new(
        &format!("_TALON_EXPORT_{}", name.to_uppercase()),
        Span::call_site(),
    );

    quote! {
        #item

        #[#core::__private::linkme::distributed_slice(#core::EXPORTS)]
        #[linkme(crate = #core::__private::linkme)]
        #[doc(hidden)]
        static #static_name: #core::Export =
            #core::Export::new(#name, ::core::file!(), || #core::classify!(#ident));
    }
    .into()
}
