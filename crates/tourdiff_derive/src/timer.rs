use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, LitStr, parse_macro_input};

pub fn timer_inner(attr: TokenStream, item: TokenStream) -> TokenStream {
    let label = if attr.is_empty() {
        None
    } else {
        Some(parse_macro_input!(attr as LitStr))
    };
    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = parse_macro_input!(item as ItemFn);

    if sig.asyncness.is_some() {
        return syn::Error::new_spanned(&sig, "`timer` does not support async functions")
            .to_compile_error()
            .into();
    }

    let label = label
        .map(|lit| lit.value())
        .unwrap_or_else(|| sig.ident.to_string());
    let stmts = &block.stmts;

    let expanded = quote! {
        #(#attrs)*
        #vis #sig {
            struct __TimerGuard(::std::time::Instant);

            impl ::core::ops::Drop for __TimerGuard {
                fn drop(&mut self) {
                    ::log::debug!(
                        "{}: elapsed_s={:.3}",
                        #label,
                        self.0.elapsed().as_secs_f64()
                    );
                }
            }

            let __timer_guard = __TimerGuard(::std::time::Instant::now());
            #(#stmts)*
        }
    };

    TokenStream::from(expanded)
}
