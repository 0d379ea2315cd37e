use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use quote::quote;
use syn::{
    parse_macro_input, parse_quote, Data, DataEnum, DataStruct, DeriveInput, Fields, GenericParam,
    Generics, Type,
};

#[proc_macro_derive(Trace)]
pub fn trace(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;
    let generics = add_bound(input.generics, parse_quote!(tricolor::Trace));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let trace_body = match input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(ref fields),
            ..
        }) => fields
            .named
            .iter()
            .map(|field| {
                let field_name = &field.ident;

                quote! {
                    tricolor::Trace::trace(&self.#field_name, tracer);
                }
            })
            .collect::<Vec<_>>(),
        Data::Struct(DataStruct {
            fields: Fields::Unnamed(ref fields),
            ..
        }) => fields
            .unnamed
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let idx = syn::Index::from(i);
                quote! {
                    tricolor::Trace::trace(&self.#idx, tracer);
                }
            })
            .collect::<Vec<_>>(),
        Data::Struct(DataStruct {
            fields: Fields::Unit,
            ..
        }) => vec![quote! {}],
        Data::Enum(DataEnum { ref variants, .. }) => {
            let arms = variants.iter().map(|variant| {
                let variant_ident = &variant.ident;

                match &variant.fields {
                    Fields::Unnamed(fields) => {
                        let idents = fields
                            .unnamed
                            .iter()
                            .enumerate()
                            .map(|(idx, _)| Ident::new(&format!("t{}", idx), Span::mixed_site()))
                            .collect::<Vec<_>>();

                        quote! {
                            #name::#variant_ident(#(#idents,)*) => {
                                #(tricolor::Trace::trace(#idents, tracer);)*
                            }
                        }
                    }
                    Fields::Named(fields) => {
                        let idents = fields
                            .named
                            .iter()
                            .filter_map(|field| field.ident.clone())
                            .collect::<Vec<_>>();

                        quote! {
                            #name::#variant_ident{#(#idents,)*} => {
                                #(tricolor::Trace::trace(#idents, tracer);)*
                            }
                        }
                    }
                    Fields::Unit => {
                        quote! {
                            #name::#variant_ident => {}
                        }
                    }
                }
            });

            if variants.is_empty() {
                vec![quote! {}]
            } else {
                vec![quote! {
                    match self { #(#arms)* }
                }]
            }
        }
        _ => unimplemented!("#[derive(Trace)] is not implemented for this type"),
    };

    // The __MustNotDrop impl conflicts with the blanket impl for every Drop
    // type, so a traced type that also implements Drop fails to compile.
    let expanded = quote! {
        #[automatically_derived]
        unsafe impl #impl_generics tricolor::Trace for #name #ty_generics #where_clause {
            const IS_LEAF: bool = false;

            fn trace(&self, tracer: &mut tricolor::Tracer) {
                #(#trace_body)*
            }
        }

        impl #impl_generics tricolor::__MustNotDrop for #name #ty_generics #where_clause {}
    };

    TokenStream::from(expanded)
}

#[proc_macro_derive(TraceLeaf)]
pub fn traceleaf(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;
    let generics = add_bound(input.generics, parse_quote!(tricolor::TraceLeaf));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let field_types: Vec<&Type> = match input.data {
        Data::Struct(DataStruct { ref fields, .. }) => fields.iter().map(|field| &field.ty).collect(),
        Data::Enum(DataEnum { ref variants, .. }) => variants
            .iter()
            .flat_map(|variant| variant.fields.iter().map(|field| &field.ty))
            .collect(),
        _ => unimplemented!("#[derive(TraceLeaf)] is not implemented for this type"),
    };

    let asserts = field_types.iter().map(|ty| {
        quote! {
            <#ty as tricolor::TraceLeaf>::__assert_trace_leaf();
        }
    });

    // Leaves hold no managed references, so unlike traced types they are
    // free to implement Drop.
    let expanded = quote! {
        #[automatically_derived]
        unsafe impl #impl_generics tricolor::TraceLeaf for #name #ty_generics #where_clause {
            fn __assert_trace_leaf() {
                #(#asserts)*
            }
        }

        #[automatically_derived]
        unsafe impl #impl_generics tricolor::Trace for #name #ty_generics #where_clause {
            const IS_LEAF: bool = true;

            fn trace(&self, _tracer: &mut tricolor::Tracer) {}
        }
    };

    TokenStream::from(expanded)
}

fn add_bound(mut generics: Generics, bound: syn::TypeParamBound) -> Generics {
    for param in &mut generics.params {
        if let GenericParam::Type(ref mut type_param) = *param {
            type_param.bounds.push(bound.clone());
        }
    }
    generics
}
