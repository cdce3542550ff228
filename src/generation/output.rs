//! Output assembly
//!
//! Produces the generated file set, relative to the output directory:
//!
//! ```text
//! .
//! |-- common.d.ts      # shared definitions, `Types` in the files below
//! |-- types.d.ts       # re-exports every group under types/
//! |-- types/<group>.d.ts
//! └-- apis/<group>.ts  # one request function per endpoint
//! ```

use indexmap::{IndexMap, IndexSet};

use crate::config::Config;
use crate::generation::schema::compile_schema;
use crate::generation::types::{Definitions, OutputFile, ResolvedApi};
use crate::generation::utils::to_pascal_case;
use crate::generation::{GenerationError, SchemaCompiler};

pub const COMMON_FILE: &str = "common.d.ts";
pub const TYPES_INDEX_FILE: &str = "types.d.ts";

/// Builds every output file in emission order: `common.d.ts` (when there is
/// anything to declare), `types.d.ts`, the group type files, then the group
/// request files.
pub fn assemble_output(
    apis: &[ResolvedApi],
    definitions: &Definitions,
    compiler: &dyn SchemaCompiler,
    config: &Config,
) -> Result<Vec<OutputFile>, GenerationError> {
    let mut files = Vec::new();
    if let Some(common) = common_declarations(definitions, compiler)? {
        files.push(common);
    }
    files.extend(type_declarations(apis, config));
    files.extend(request_functions(apis, config));
    Ok(files)
}

/// Compiles every definition into `common.d.ts`.
///
/// The compiler may emit referenced definitions alongside the one asked for,
/// so the combined text is split into declarations and identical ones are kept
/// once, in first-seen order.
pub fn common_declarations(
    definitions: &Definitions,
    compiler: &dyn SchemaCompiler,
) -> Result<Option<OutputFile>, GenerationError> {
    let compiled = definitions
        .iter()
        .map(|(name, schema)| compile_schema(compiler, schema, name, definitions))
        .collect::<Result<Vec<_>, _>>()?
        .concat();

    let unique: IndexSet<String> = split_declarations(&compiled).into_iter().collect();

    if unique.is_empty() {
        return Ok(None);
    }
    let content = unique.into_iter().collect::<Vec<_>>().join("\n");
    Ok(Some(OutputFile::new(COMMON_FILE, content)))
}

/// Splits compiler output at every top-level `export`. A doc comment directly
/// above an `export` stays with that declaration.
fn split_declarations(compiled: &str) -> Vec<String> {
    let lines: Vec<&str> = compiled.lines().collect();
    let mut starts = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if !line.starts_with("export ") {
            continue;
        }
        let mut start = index;
        if index > 0 && lines[index - 1] == " */" {
            if let Some(open) = lines[..index - 1].iter().rposition(|l| *l == "/**") {
                start = open;
            }
        }
        starts.push(start);
    }
    if let Some(first) = starts.first_mut() {
        *first = 0;
    }
    starts.push(lines.len());

    starts
        .windows(2)
        .map(|bounds| lines[bounds[0]..bounds[1]].join("\n").trim().to_string())
        .filter(|declaration| !declaration.is_empty())
        .collect()
}

/// `types.d.ts` followed by one namespace file per group
pub fn type_declarations(apis: &[ResolvedApi], config: &Config) -> Vec<OutputFile> {
    let mut groups: IndexMap<String, String> = IndexMap::new();
    for api in apis {
        groups
            .entry(group_of(api))
            .or_default()
            .push_str(&combine_single_type(api, config));
    }

    let envelope = config
        .success_response_template
        .as_deref()
        .map(|template| format!("type ApiResponse<T> = {template}\n"))
        .unwrap_or_default();

    let index = groups
        .keys()
        .map(|group| format!("export * from './types/{group}'"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut files = vec![OutputFile::new(TYPES_INDEX_FILE, index)];
    for (group, content) in groups {
        let namespace = to_pascal_case(&group);
        let import = if content.contains("Types") {
            "import Types from '../common';\n"
        } else {
            ""
        };
        files.push(OutputFile::new(
            format!("types/{group}.d.ts"),
            format!(
                "{import}{envelope}export namespace {namespace} {{\n {content}\n}}\nexport default {namespace}"
            ),
        ));
    }
    files
}

/// One `apis/<group>.ts` file per group
pub fn request_functions(apis: &[ResolvedApi], config: &Config) -> Vec<OutputFile> {
    let request_import = config
        .request_template
        .clone()
        .unwrap_or_else(|| format!("import request from '{}'", config.axios_file_path));

    let mut groups: IndexMap<String, String> = IndexMap::new();
    for api in apis {
        let group = group_of(api);
        let content = groups.entry(group.clone()).or_insert_with(|| {
            format!("{request_import}\nimport Api from '../types/{group}'\n")
        });
        content.push_str(&combine_single_api(api));
        content.push('\n');
    }

    groups
        .into_iter()
        .map(|(group, content)| OutputFile::new(format!("apis/{group}.ts"), content))
        .collect()
}

/// The type namespace of one endpoint
pub fn combine_single_type(api: &ResolvedApi, config: &Config) -> String {
    let namespace = to_pascal_case(api.fn_name.as_deref().unwrap_or_default());
    let params = [&api.query, &api.body, &api.header, &api.cookie]
        .into_iter()
        .filter_map(|fragment| present(fragment))
        .collect::<Vec<_>>()
        .join("\n  ");
    let data = present(&api.response).unwrap_or("export type Data = any");
    let response = if config.success_response_template.is_some() {
        "Promise<ApiResponse<Data>>"
    } else {
        "Promise<Data>"
    };
    format!(
        "{comment}export namespace {namespace} {{\n      {params}\n      {data}\n      export type Response = {response}\n    }}\n  ",
        comment = api.fn_comment.as_deref().unwrap_or_default(),
    )
}

/// The request function of one endpoint
pub fn combine_single_api(api: &ResolvedApi) -> String {
    let fn_name = api.fn_name.as_deref().unwrap_or_default();
    let namespace = to_pascal_case(fn_name);

    let buckets: Vec<(&str, &str)> = [
        ("query", &api.query, "params: query"),
        ("body", &api.body, "data: body"),
        ("header", &api.header, "headers: header"),
        ("cookie", &api.cookie, "cookie"),
    ]
    .into_iter()
    .filter(|(_, fragment, _)| present(fragment).is_some())
    .map(|(name, _, request)| (name, request))
    .collect();

    let arguments = buckets
        .iter()
        .map(|(name, _)| format!("{name}: Api.{namespace}.{}", to_pascal_case(name)))
        .collect::<Vec<_>>()
        .join(", ");
    let requests = buckets
        .iter()
        .map(|(_, request)| *request)
        .collect::<Vec<_>>()
        .join(",\n    ");

    let path_params = present(&api.params);
    let url = api.url.as_deref().unwrap_or_default();
    let url = match path_params {
        Some(_) => format!("`{url}`"),
        None => format!("'{url}'"),
    };
    let leading = match path_params {
        Some(params) if !arguments.is_empty() => format!("{params}, "),
        Some(params) => params.to_string(),
        None => String::new(),
    };
    let method = present(&api.method).unwrap_or("GET").to_uppercase();

    format!(
        "{comment}export function {fn_name}({leading}{arguments}): Api.{namespace}.Response {{\n  return request({{\n    method: '{method}',\n    url: {url},\n    {requests}\n  }})\n}}\n",
        comment = api.fn_comment.as_deref().unwrap_or_default(),
    )
}

fn group_of(api: &ResolvedApi) -> String {
    api.file_name.clone().unwrap_or_default()
}

fn present(fragment: &Option<String>) -> Option<&str> {
    fragment.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::compiler::TypeScriptCompiler;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::PathBuf;

    fn config() -> Config {
        Config::for_output_dir("/tmp/out")
    }

    #[test]
    fn test_common_declarations_empty() {
        let result = common_declarations(&Definitions::new(), &TypeScriptCompiler::new()).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_common_declarations_are_deduplicated() {
        let mut schemas = IndexMap::new();
        schemas.insert(
            "Foo".to_string(),
            json!({
                "type": "object",
                "properties": { "id": { "type": "string", "description": "这是 ID" } },
                "required": ["id"],
                "additionalProperties": false
            }),
        );
        schemas.insert(
            "Bar".to_string(),
            json!({
                "type": "object",
                "properties": { "zoo": { "$ref": "#/definitions/Foo" } },
                "required": ["zoo"],
                "additionalProperties": false
            }),
        );
        let definitions = Definitions::from(schemas);

        let common = common_declarations(&definitions, &TypeScriptCompiler::new())
            .unwrap()
            .unwrap();
        assert_eq!(common.path, PathBuf::from("common.d.ts"));
        assert_eq!(
            common.content,
            "export interface Foo {\n/**\n * 这是 ID\n */\nid: string\n}\nexport interface Bar {\nzoo: Foo\n}"
        );
    }

    #[test]
    fn test_common_declarations_keep_doc_comments_with_their_declaration() {
        let mut schemas = IndexMap::new();
        schemas.insert(
            "Foo".to_string(),
            json!({
                "description": "a foo",
                "type": "object",
                "properties": { "id": { "type": "string" } },
                "additionalProperties": false
            }),
        );
        schemas.insert(
            "Bar".to_string(),
            json!({
                "description": "a bar",
                "type": "object",
                "properties": { "foo": { "$ref": "#/definitions/Foo" } },
                "additionalProperties": false
            }),
        );
        let definitions = Definitions::from(schemas);

        let common = common_declarations(&definitions, &TypeScriptCompiler::new())
            .unwrap()
            .unwrap();
        assert_eq!(
            common.content,
            "/**\n * a foo\n */\nexport interface Foo {\nid?: string\n}\n/**\n * a bar\n */\nexport interface Bar {\nfoo?: Foo\n}"
        );
        assert!(!common.content.contains("export /**"));
    }

    #[test]
    fn test_split_declarations_leaves_property_comments_in_place() {
        let compiled = "export interface A {\n/**\n * id\n */\nid: string\n}\n/**\n * b\n */\nexport type B = number\n";
        assert_eq!(
            split_declarations(compiled),
            vec![
                "export interface A {\n/**\n * id\n */\nid: string\n}".to_string(),
                "/**\n * b\n */\nexport type B = number".to_string(),
            ]
        );
    }

    #[test]
    fn test_combine_single_type_with_template() {
        let api = ResolvedApi {
            fn_name: Some("getUser".to_string()),
            fn_comment: Some("/** c */\n".to_string()),
            body: Some("export interface Body {}".to_string()),
            query: Some("export interface Query {}".to_string()),
            response: Some("export interface Data {}".to_string()),
            ..ResolvedApi::default()
        };
        let mut config = config();
        config.success_response_template = Some("{code: number; data: T}".to_string());
        assert_eq!(
            combine_single_type(&api, &config),
            "/** c */\nexport namespace GetUser {\n      export interface Query {}\n  export interface Body {}\n      export interface Data {}\n      export type Response = Promise<ApiResponse<Data>>\n    }\n  "
        );
    }

    #[test]
    fn test_combine_single_type_without_response() {
        let api = ResolvedApi {
            fn_name: Some("get_user".to_string()),
            ..ResolvedApi::default()
        };
        assert_eq!(
            combine_single_type(&api, &config()),
            "export namespace GetUser {\n      \n      export type Data = any\n      export type Response = Promise<Data>\n    }\n  "
        );
    }

    #[test]
    fn test_combine_single_api_with_everything() {
        let api = ResolvedApi {
            fn_name: Some("getUser".to_string()),
            body: Some("b".to_string()),
            query: Some("q".to_string()),
            header: Some("h".to_string()),
            params: Some("name: string, age: number".to_string()),
            method: Some("post".to_string()),
            url: Some("/user/${name}".to_string()),
            ..ResolvedApi::default()
        };
        assert_eq!(
            combine_single_api(&api),
            "export function getUser(name: string, age: number, query: Api.GetUser.Query, body: Api.GetUser.Body, header: Api.GetUser.Header): Api.GetUser.Response {\n  return request({\n    method: 'POST',\n    url: `/user/${name}`,\n    params: query,\n    data: body,\n    headers: header\n  })\n}\n"
        );
    }

    #[test]
    fn test_combine_single_api_minimal() {
        let api = ResolvedApi {
            fn_name: Some("getUser".to_string()),
            url: Some("/user".to_string()),
            ..ResolvedApi::default()
        };
        assert_eq!(
            combine_single_api(&api),
            "export function getUser(): Api.GetUser.Response {\n  return request({\n    method: 'GET',\n    url: '/user',\n    \n  })\n}\n"
        );
    }

    #[test]
    fn test_combine_single_api_path_params_only() {
        let api = ResolvedApi {
            fn_name: Some("getUser".to_string()),
            url: Some("/user/${id}".to_string()),
            params: Some("id: number".to_string()),
            cookie: Some("c".to_string()),
            ..ResolvedApi::default()
        };
        let rendered = combine_single_api(&api);
        assert!(rendered.starts_with(
            "export function getUser(id: number, cookie: Api.GetUser.Cookie): Api.GetUser.Response {"
        ));
        assert!(rendered.contains("url: `/user/${id}`,"));
        assert!(rendered.contains("    cookie\n"));
    }

    fn grouped_apis() -> Vec<ResolvedApi> {
        vec![
            ResolvedApi {
                fn_name: Some("getUser".to_string()),
                file_name: Some("user".to_string()),
                url: Some("/user".to_string()),
                response: Some("export type Data = Types.User".to_string()),
                ..ResolvedApi::default()
            },
            ResolvedApi {
                fn_name: Some("createUser".to_string()),
                file_name: Some("user".to_string()),
                url: Some("/user".to_string()),
                method: Some("post".to_string()),
                ..ResolvedApi::default()
            },
            ResolvedApi {
                fn_name: Some("upload".to_string()),
                file_name: Some("oss".to_string()),
                url: Some("/oss".to_string()),
                ..ResolvedApi::default()
            },
        ]
    }

    #[test]
    fn test_type_declarations_grouping() {
        let files = type_declarations(&grouped_apis(), &config());
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("types.d.ts"),
                PathBuf::from("types/user.d.ts"),
                PathBuf::from("types/oss.d.ts"),
            ]
        );
        assert_eq!(
            files[0].content,
            "export * from './types/user'\nexport * from './types/oss'"
        );
        assert!(files[1].content.starts_with("import Types from '../common';\nexport namespace User {\n "));
        assert!(files[1].content.ends_with("\n}\nexport default User"));
        assert!(files[2].content.starts_with("export namespace Oss {"));
    }

    #[test]
    fn test_type_declarations_declare_response_envelope() {
        let mut config = config();
        config.success_response_template = Some("{ code: number; data: T }".to_string());
        let files = type_declarations(&grouped_apis(), &config);
        assert!(files[2]
            .content
            .starts_with("type ApiResponse<T> = { code: number; data: T }\nexport namespace Oss {"));
    }

    #[test]
    fn test_request_functions() {
        let files = request_functions(&grouped_apis(), &config());
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, PathBuf::from("apis/user.ts"));
        assert!(files[0]
            .content
            .starts_with("import request from 'axios'\nimport Api from '../types/user'\nexport function getUser("));
        assert!(files[0].content.contains("method: 'POST'"));
        assert_eq!(files[1].path, PathBuf::from("apis/oss.ts"));
    }

    #[test]
    fn test_request_functions_use_request_template() {
        let mut config = config();
        config.request_template = Some("import { request } from '@/utils/request'".to_string());
        let files = request_functions(&grouped_apis(), &config);
        assert!(files[0]
            .content
            .starts_with("import { request } from '@/utils/request'\nimport Api from '../types/user'\n"));
    }

    #[test]
    fn test_assemble_output_order() {
        let mut schemas = IndexMap::new();
        schemas.insert("User".to_string(), json!({ "type": "string" }));
        let definitions = Definitions::from(schemas);
        let files = assemble_output(
            &grouped_apis(),
            &definitions,
            &TypeScriptCompiler::new(),
            &config(),
        )
        .unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.to_string_lossy().into_owned()).collect();
        assert_eq!(
            paths,
            vec![
                "common.d.ts",
                "types.d.ts",
                "types/user.d.ts",
                "types/oss.d.ts",
                "apis/user.ts",
                "apis/oss.ts"
            ]
        );
        assert_eq!(files[0].content, "export type User = string");
    }
}
