use crate::derive_utils::apply_derives;
use crate::field_utils::ensure_leading_fields;
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, LitStr, Result, Token, Type, parse::Parse, parse::ParseStream, parse_macro_input};

const SUFFIX: &str = "IntegrationEvent";

/// #[integration_event] 宏实现
/// - 确保 `id: Uuid`、`created_time: DateTime<Utc>` 位于字段最前（缺失则补齐为 `pub`）
/// - 合并派生：Debug、Clone、PartialEq、Serialize、Deserialize
/// - 生成 `new(<其余字段>)`，自动填充新的事件标识与当前时间
/// - 实现 `::integration_event_log::integration_event::IntegrationEvent`
/// - 支持参数：`#[integration_event(name = "...")]` 覆盖短类型名，需以 `IntegrationEvent` 结尾
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as IntegrationEventAttr);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[integration_event] only on struct")
                .to_compile_error()
                .into();
        }
    };

    let short_name = match &cfg.name {
        Some(lit) => lit.value(),
        None => st.ident.to_string(),
    };
    if !short_name.ends_with(SUFFIX) || short_name == SUFFIX {
        let span = cfg.name.as_ref().map_or_else(|| st.ident.span(), LitStr::span);
        return syn::Error::new(
            span,
            format!("integration event name `{short_name}` must end with `{SUFFIX}`"),
        )
        .to_compile_error()
        .into();
    }

    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return syn::Error::new(st.span(), "only supports named-field struct")
                .to_compile_error()
                .into();
        }
    };

    let uuid_ty: Type = syn::parse_quote! { ::integration_event_log::__private::Uuid };
    let time_ty: Type = syn::parse_quote! {
        ::integration_event_log::__private::DateTime<::integration_event_log::__private::Utc>
    };
    let own_fields = ensure_leading_fields(
        fields_named,
        &[("id", uuid_ty.clone()), ("created_time", time_ty.clone())],
    );

    apply_derives(
        &mut st.attrs,
        vec![
            syn::parse_quote!(Debug),
            syn::parse_quote!(Clone),
            syn::parse_quote!(PartialEq),
            syn::parse_quote!(serde::Serialize),
            syn::parse_quote!(serde::Deserialize),
        ],
    );

    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    let params = own_fields.iter().map(|f| {
        let name = &f.ident;
        let ty = &f.ty;
        quote! { #name: #ty }
    });
    let names = own_fields.iter().map(|f| &f.ident);

    let expanded = quote! {
        #st

        impl #impl_generics #ident #ty_generics #where_clause {
            /// 以新的事件标识与当前时间创建事件
            #[allow(clippy::too_many_arguments)]
            pub fn new(#(#params),*) -> Self {
                Self {
                    id: ::integration_event_log::__private::Uuid::new_v4(),
                    created_time: ::integration_event_log::__private::Utc::now(),
                    #(#names),*
                }
            }
        }

        impl #impl_generics ::integration_event_log::integration_event::IntegrationEvent
            for #ident #ty_generics #where_clause
        {
            const TYPE_NAME: &'static str = concat!(module_path!(), "::", #short_name);

            fn id(&self) -> #uuid_ty {
                self.id
            }

            fn created_time(&self) -> #time_ty {
                self.created_time
            }
        }
    };

    TokenStream::from(expanded)
}

// -------- parsing --------

#[derive(Default)]
struct IntegrationEventAttr {
    name: Option<LitStr>,
}

impl Parse for IntegrationEventAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut cfg = IntegrationEventAttr::default();
        if input.is_empty() {
            return Ok(cfg);
        }

        let key: syn::Ident = input.parse()?;
        if key != "name" {
            return Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'name'",
            ));
        }
        let _eq: Token![=] = input.parse()?;
        cfg.name = Some(input.parse()?);

        if !input.is_empty() {
            let _comma: Token![,] = input.parse()?;
        }
        if !input.is_empty() {
            return Err(input.error("unexpected tokens after 'name'"));
        }
        Ok(cfg)
    }
}
