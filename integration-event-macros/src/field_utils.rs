use syn::{Field, FieldsNamed, Ident, Token, Type, punctuated::Punctuated};

/// 将必需字段按给定顺序放在最前：已声明的沿用用户定义，缺失的以 `pub` 字段补齐；
/// 返回其余（用户自有）字段的副本，供生成构造函数使用
pub(crate) fn ensure_leading_fields(
    fields_named: &mut FieldsNamed,
    required: &[(&str, Type)],
) -> Vec<Field> {
    let is_required = |field: &Field| {
        field
            .ident
            .as_ref()
            .is_some_and(|ident| required.iter().any(|(name, _)| ident == name))
    };

    let mut leading: Punctuated<Field, Token![,]> = Punctuated::new();
    for (name, ty) in required {
        let declared = fields_named
            .named
            .iter()
            .find(|f| f.ident.as_ref().is_some_and(|ident| ident == name))
            .cloned();
        let field = declared.unwrap_or_else(|| {
            let ident = Ident::new(name, proc_macro2::Span::call_site());
            syn::parse_quote! { pub #ident: #ty }
        });
        leading.push(field);
    }

    let own: Vec<Field> = fields_named
        .named
        .iter()
        .filter(|f| !is_required(f))
        .cloned()
        .collect();

    leading.extend(own.iter().cloned());
    fields_named.named = leading;
    own
}
