//! Type descriptors.
//!
//! Maps structural types to the target's encoded descriptor grammar:
//! `I`, `Z`, `V`, `Ljava/lang/String;`, `LName;`, with one `[` prepended
//! per array dimension.

use mjc_ast::{Symbol, Type, TypeName};

pub fn descriptor(ty: &Type) -> String {
    let base = match &ty.name {
        TypeName::Int => "I".to_string(),
        TypeName::Boolean => "Z".to_string(),
        TypeName::Void => "V".to_string(),
        TypeName::String => "Ljava/lang/String;".to_string(),
        TypeName::Class(name) => format!("L{};", name),
    };
    if ty.is_array {
        format!("[{}", base)
    } else {
        base
    }
}

pub fn method_descriptor(params: &[Symbol], return_ty: &Type) -> String {
    let mut out = String::from("(");
    for param in params {
        out.push_str(&descriptor(&param.ty));
    }
    out.push(')');
    out.push_str(&descriptor(return_ty));
    out
}
