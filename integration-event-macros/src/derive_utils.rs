use quote::ToTokens;
use std::collections::HashSet;
use syn::{Attribute, Path, Token, punctuated::Punctuated};

// serde 的派生无论写成 `Serialize` 还是 `serde::Serialize` 都视为同一项
fn derive_key(path: &Path) -> String {
    match path.segments.last() {
        Some(last) => match last.ident.to_string().as_str() {
            name @ ("Serialize" | "Deserialize") => format!("serde::{name}"),
            name => name.to_string(),
        },
        None => path.to_token_stream().to_string(),
    }
}

/// 在结构体属性上合并派生：必需项在前，用户已有派生去重后跟随，其余属性保持原样
pub(crate) fn apply_derives(attrs: &mut Vec<Attribute>, required: Vec<Path>) {
    let mut derives = required;
    let mut others = Vec::with_capacity(attrs.len());

    for attr in attrs.drain(..) {
        if !attr.path().is_ident("derive") {
            others.push(attr);
            continue;
        }
        match attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated) {
            Ok(list) => derives.extend(list),
            Err(_) => others.push(attr),
        }
    }

    let mut seen = HashSet::new();
    derives.retain(|path| seen.insert(derive_key(path)));

    attrs.push(syn::parse_quote!(#[derive(#(#derives),*)]));
    attrs.extend(others);
}
