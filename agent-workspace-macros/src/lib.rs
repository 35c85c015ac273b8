use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, GenericArgument, Lit, PathArguments,
    Type,
};

#[proc_macro_derive(AgentDefinition, attributes(agent, field))]
pub fn derive_agent_definition(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    // Extract agent metadata from #[agent(...)]
    let agent_meta = extract_agent_meta(&input.attrs);

    // Extract field schemas from struct fields
    let field_schemas: Vec<proc_macro2::TokenStream> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields
                .named
                .iter()
                .map(|f| {
                    let name = f.ident.as_ref().unwrap().to_string();

                    let inferred_type = infer_field_type(&f.ty);
                    let meta = extract_field_meta(&f.attrs);
                    let required = !is_option_type(&f.ty);

                    let label = &meta.label;
                    let description = &meta.description;

                    // Use override if provided, otherwise infer
                    let final_field_type = meta.field_type.unwrap_or(inferred_type);
                    let default = meta
                        .default
                        .map(|d| quote! { Some(#d.to_string()) })
                        .unwrap_or(quote! { None });
                    let required_for_stages = meta
                        .stages
                        .map(|stages| quote! { Some(vec![#(#stages),*]) })
                        .unwrap_or(quote! { None });

                    quote! {
                        agent_workspace_sdk::FieldSchema {
                            name: #name.to_string(),
                            field_type: #final_field_type,
                            label: #label.to_string(),
                            description: #description.to_string(),
                            required: #required,
                            default: #default,
                            required_for_stages: #required_for_stages,
                        }
                    }
                })
                .collect(),
            _ => panic!("AgentDefinition only supports named fields"),
        },
        _ => panic!("AgentDefinition only supports structs"),
    };

    let struct_name = &input.ident;
    let agent_id = &agent_meta.id;
    let agent_name = &agent_meta.name;
    let agent_desc = &agent_meta.description;

    let expanded = quote! {
        impl agent_workspace_sdk::AgentDefinition for #struct_name {
            fn metadata() -> agent_workspace_sdk::AgentMetadata {
                agent_workspace_sdk::AgentMetadata {
                    id: #agent_id.to_string(),
                    name: #agent_name.to_string(),
                    description: #agent_desc.to_string(),
                }
            }

            fn fields() -> Vec<agent_workspace_sdk::FieldSchema> {
                vec![#(#field_schemas),*]
            }
        }
    };

    TokenStream::from(expanded)
}

struct AgentMeta {
    id: String,
    name: String,
    description: String,
}

fn extract_agent_meta(attrs: &[Attribute]) -> AgentMeta {
    for attr in attrs {
        if attr.path().is_ident("agent") {
            let mut id = String::new();
            let mut name = String::new();
            let mut description = String::new();

            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    let value = meta.value()?;
                    let lit: Lit = value.parse()?;
                    if let Lit::Str(s) = lit {
                        id = s.value();
                    }
                } else if meta.path.is_ident("name") {
                    let value = meta.value()?;
                    let lit: Lit = value.parse()?;
                    if let Lit::Str(s) = lit {
                        name = s.value();
                    }
                } else if meta.path.is_ident("description") {
                    let value = meta.value()?;
                    let lit: Lit = value.parse()?;
                    if let Lit::Str(s) = lit {
                        description = s.value();
                    }
                }
                Ok(())
            });

            return AgentMeta {
                id,
                name,
                description,
            };
        }
    }

    panic!("Missing #[agent(...)] attribute");
}

struct FieldMeta {
    label: String,
    description: String,
    field_type: Option<proc_macro2::TokenStream>,
    default: Option<String>,
    stages: Option<Vec<usize>>,
}

fn extract_field_meta(attrs: &[Attribute]) -> FieldMeta {
    let mut label = String::new();
    let mut description = String::new();
    let mut field_type = None;
    let mut min = None;
    let mut max = None;
    let mut options = None;
    let mut pattern = None;
    let mut default = None;
    let mut stages = None;

    for attr in attrs {
        if attr.path().is_ident("field") {
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("label") {
                    let value = meta.value()?;
                    let lit: Lit = value.parse()?;
                    if let Lit::Str(s) = lit {
                        label = s.value();
                    }
                } else if meta.path.is_ident("description") {
                    let value = meta.value()?;
                    let lit: Lit = value.parse()?;
                    if let Lit::Str(s) = lit {
                        description = s.value();
                    }
                } else if meta.path.is_ident("type") {
                    let value = meta.value()?;
                    let lit: Lit = value.parse()?;
                    if let Lit::Str(s) = lit {
                        field_type = Some(s.value());
                    }
                } else if meta.path.is_ident("min") {
                    let value = meta.value()?;
                    let lit: Lit = value.parse()?;
                    if let Lit::Str(s) = lit {
                        min = s.value().parse::<i64>().ok();
                    }
                } else if meta.path.is_ident("max") {
                    let value = meta.value()?;
                    let lit: Lit = value.parse()?;
                    if let Lit::Str(s) = lit {
                        max = s.value().parse::<i64>().ok();
                    }
                } else if meta.path.is_ident("options") {
                    let value = meta.value()?;
                    let lit: Lit = value.parse()?;
                    if let Lit::Str(s) = lit {
                        options = Some(
                            s.value()
                                .split('|')
                                .map(|o| o.trim().to_string())
                                .collect::<Vec<_>>(),
                        );
                    }
                } else if meta.path.is_ident("pattern") {
                    let value = meta.value()?;
                    let lit: Lit = value.parse()?;
                    if let Lit::Str(s) = lit {
                        pattern = Some(s.value());
                    }
                } else if meta.path.is_ident("default") {
                    let value = meta.value()?;
                    let lit: Lit = value.parse()?;
                    if let Lit::Str(s) = lit {
                        default = Some(s.value());
                    }
                } else if meta.path.is_ident("stages") {
                    let value = meta.value()?;
                    let lit: Lit = value.parse()?;
                    if let Lit::Str(s) = lit {
                        stages = Some(
                            s.value()
                                .split(',')
                                .filter_map(|p| p.trim().parse().ok())
                                .collect::<Vec<usize>>(),
                        );
                    }
                }
                Ok(())
            });
        }
    }

    // Build field type from parsed values
    let field_type_token = field_type.map(|ft| match ft.as_str() {
        "text" => quote! { agent_workspace_sdk::FieldType::Text },
        "number" => {
            let min_token = min.map(|m| quote! { Some(#m) }).unwrap_or(quote! { None });
            let max_token = max.map(|m| quote! { Some(#m) }).unwrap_or(quote! { None });
            quote! { agent_workspace_sdk::FieldType::Number { min: #min_token, max: #max_token } }
        }
        "select" => {
            let opts = options.clone().unwrap_or_default();
            quote! { agent_workspace_sdk::FieldType::Select { options: vec![#(#opts.to_string()),*] } }
        }
        "file_path" => {
            let pattern_token = pattern
                .clone()
                .map(|p| quote! { Some(#p.to_string()) })
                .unwrap_or(quote! { None });
            quote! { agent_workspace_sdk::FieldType::FilePath { pattern: #pattern_token } }
        }
        _ => quote! { agent_workspace_sdk::FieldType::Text },
    });

    FieldMeta {
        label,
        description,
        field_type: field_type_token,
        default,
        stages,
    }
}

fn infer_field_type(ty: &Type) -> proc_macro2::TokenStream {
    // Check if it's Option<T>
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Option" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner_ty)) = args.args.first() {
                        return infer_field_type_inner(inner_ty);
                    }
                }
            } else {
                return infer_field_type_inner(ty);
            }
        }
    }

    quote! { agent_workspace_sdk::FieldType::Text }
}

fn infer_field_type_inner(ty: &Type) -> proc_macro2::TokenStream {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            let type_name = segment.ident.to_string();
            match type_name.as_str() {
                "String" => quote! { agent_workspace_sdk::FieldType::Text },
                "PathBuf" => {
                    quote! { agent_workspace_sdk::FieldType::FilePath { pattern: None } }
                }
                "usize" | "u32" | "u64" | "i32" | "i64" => {
                    quote! { agent_workspace_sdk::FieldType::Number { min: None, max: None } }
                }
                _ => quote! { agent_workspace_sdk::FieldType::Text },
            }
        } else {
            quote! { agent_workspace_sdk::FieldType::Text }
        }
    } else {
        quote! { agent_workspace_sdk::FieldType::Text }
    }
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}
