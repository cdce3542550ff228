//! Per-field resolution of extracted Apis into TypeScript fragments
//!
//! A [`Resolver`] is a table of field functions. [`Resolver::defaults`]
//! builds the standard table; [`ResolverOverrides`] carries any subset of
//! replacement functions and [`Resolver::merge`] picks the override for each
//! field that has one.

use std::fmt;
use std::sync::Arc;

use crate::generation::schema::{
    change_openapi_to_json_schema, parameters_to_ts, schema_to_inline_ts, schema_to_ts,
};
use crate::generation::types::{Api, Definitions, ResolvedApi};
use crate::generation::{GenerationError, SchemaCompiler};

/// One field function of the resolver table
pub type ResolverFn = Arc<dyn Fn(&Api) -> Result<Option<String>, GenerationError> + Send + Sync>;

const ANONYMOUS: &str = "anonymous";

/// Builds a [`ResolverFn`] from a closure
pub fn resolver_fn<F>(f: F) -> ResolverFn
where
    F: Fn(&Api) -> Result<Option<String>, GenerationError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A field function that always resolves to nothing, disabling the field
pub fn disabled() -> ResolverFn {
    resolver_fn(|_| Ok(None))
}

/// User-supplied replacements for any subset of the resolver fields
#[derive(Clone, Default)]
pub struct ResolverOverrides {
    pub file_name: Option<ResolverFn>,
    pub url: Option<ResolverFn>,
    pub method: Option<ResolverFn>,
    pub fn_name: Option<ResolverFn>,
    pub fn_comment: Option<ResolverFn>,
    pub params: Option<ResolverFn>,
    pub query: Option<ResolverFn>,
    pub cookie: Option<ResolverFn>,
    pub header: Option<ResolverFn>,
    pub body: Option<ResolverFn>,
    pub response: Option<ResolverFn>,
}

impl ResolverOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Naming for backends that tag operations with `<Name>Controller` and
    /// use `<service>.<controller>.<method>` operation ids.
    ///
    /// Header and cookie types are only generated when switched on.
    pub fn controller_convention(header: bool, cookie: bool) -> Self {
        Self {
            file_name: Some(resolver_fn(|api| {
                let name = api
                    .tags
                    .as_ref()
                    .and_then(|tags| tags.first())
                    .map(|tag| tag.replacen("Controller", "", 1).to_lowercase())
                    .unwrap_or_else(|| ANONYMOUS.to_string());
                Ok(Some(name))
            })),
            fn_name: Some(resolver_fn(|api| {
                let name = api.operation_id.as_deref().map(|id| {
                    let segments: Vec<&str> = id.split('.').collect();
                    if segments.len() >= 3 {
                        segments[2].to_string()
                    } else {
                        segments[0].to_string()
                    }
                });
                Ok(Some(name.unwrap_or_else(|| ANONYMOUS.to_string())))
            })),
            header: (!header).then(disabled),
            cookie: (!cookie).then(disabled),
            ..Self::default()
        }
    }

    /// Layers `other` on top of `self`; fields set in `other` win.
    pub fn and(self, other: ResolverOverrides) -> Self {
        Self {
            file_name: other.file_name.or(self.file_name),
            url: other.url.or(self.url),
            method: other.method.or(self.method),
            fn_name: other.fn_name.or(self.fn_name),
            fn_comment: other.fn_comment.or(self.fn_comment),
            params: other.params.or(self.params),
            query: other.query.or(self.query),
            cookie: other.cookie.or(self.cookie),
            header: other.header.or(self.header),
            body: other.body.or(self.body),
            response: other.response.or(self.response),
        }
    }

    fn overridden(&self) -> Vec<&'static str> {
        [
            ("fileName", self.file_name.is_some()),
            ("url", self.url.is_some()),
            ("method", self.method.is_some()),
            ("fnName", self.fn_name.is_some()),
            ("fnComment", self.fn_comment.is_some()),
            ("params", self.params.is_some()),
            ("query", self.query.is_some()),
            ("cookie", self.cookie.is_some()),
            ("header", self.header.is_some()),
            ("body", self.body.is_some()),
            ("response", self.response.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

impl fmt::Debug for ResolverOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverOverrides")
            .field("overridden", &self.overridden())
            .finish()
    }
}

/// The complete resolver table
#[derive(Clone)]
pub struct Resolver {
    pub file_name: ResolverFn,
    pub url: ResolverFn,
    pub method: ResolverFn,
    pub fn_name: ResolverFn,
    pub fn_comment: ResolverFn,
    pub params: ResolverFn,
    pub query: ResolverFn,
    pub cookie: ResolverFn,
    pub header: ResolverFn,
    pub body: ResolverFn,
    pub response: ResolverFn,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

impl Resolver {
    /// The standard resolver, rendering schemas against `definitions`
    pub fn defaults(definitions: Arc<Definitions>, compiler: Arc<dyn SchemaCompiler>) -> Self {
        let params = {
            let (definitions, compiler) = (definitions.clone(), compiler.clone());
            resolver_fn(move |api| {
                if api.params.is_empty() {
                    return Ok(None);
                }
                let fragments = api
                    .params
                    .iter()
                    .map(|param| schema_to_inline_ts(compiler.as_ref(), param, &definitions))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Some(fragments.join(", ")))
            })
        };

        let query = {
            let (definitions, compiler) = (definitions.clone(), compiler.clone());
            resolver_fn(move |api| {
                parameters_to_ts(compiler.as_ref(), &api.query, "Query", &definitions)
            })
        };

        let cookie = {
            let (definitions, compiler) = (definitions.clone(), compiler.clone());
            resolver_fn(move |api| {
                parameters_to_ts(compiler.as_ref(), &api.cookie, "Cookie", &definitions)
            })
        };

        let header = {
            let (definitions, compiler) = (definitions.clone(), compiler.clone());
            resolver_fn(move |api| {
                parameters_to_ts(compiler.as_ref(), &api.header, "Header", &definitions)
            })
        };

        let body = {
            let (definitions, compiler) = (definitions.clone(), compiler.clone());
            resolver_fn(move |api| {
                schema_to_ts(compiler.as_ref(), api.body.as_ref(), "Body", &definitions)
            })
        };

        let response = resolver_fn(move |api| {
            let Some(data) = api.response.get("200").or_else(|| api.response.get("default"))
            else {
                return Ok(None);
            };
            let data = serde_json::to_value(data)?;
            let schema = change_openapi_to_json_schema(&data, "Data");
            schema_to_ts(compiler.as_ref(), schema.as_ref(), "Data", &definitions)
        });

        Self {
            file_name: resolver_fn(|api| {
                let name = api
                    .tags
                    .as_ref()
                    .and_then(|tags| tags.first())
                    .filter(|tag| !tag.is_empty())
                    .cloned()
                    .unwrap_or_else(|| ANONYMOUS.to_string());
                Ok(Some(name))
            }),
            url: resolver_fn(|api| Ok(Some(api.url.replace('{', "${")))),
            method: resolver_fn(|api| Ok(Some(api.method.clone()))),
            fn_name: resolver_fn(|api| {
                let name = api
                    .operation_id
                    .clone()
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| ANONYMOUS.to_string());
                Ok(Some(name))
            }),
            fn_comment: resolver_fn(|api| {
                Ok(function_comment(
                    api.description.as_deref(),
                    api.summary.as_deref(),
                ))
            }),
            params,
            query,
            cookie,
            header,
            body,
            response,
        }
    }

    /// Replaces every field that `overrides` sets
    pub fn merge(self, overrides: ResolverOverrides) -> Self {
        Self {
            file_name: overrides.file_name.unwrap_or(self.file_name),
            url: overrides.url.unwrap_or(self.url),
            method: overrides.method.unwrap_or(self.method),
            fn_name: overrides.fn_name.unwrap_or(self.fn_name),
            fn_comment: overrides.fn_comment.unwrap_or(self.fn_comment),
            params: overrides.params.unwrap_or(self.params),
            query: overrides.query.unwrap_or(self.query),
            cookie: overrides.cookie.unwrap_or(self.cookie),
            header: overrides.header.unwrap_or(self.header),
            body: overrides.body.unwrap_or(self.body),
            response: overrides.response.unwrap_or(self.response),
        }
    }

    /// Runs every field function over one Api
    pub fn resolve(&self, api: &Api) -> Result<ResolvedApi, GenerationError> {
        Ok(ResolvedApi {
            file_name: (self.file_name)(api)?,
            url: (self.url)(api)?,
            method: (self.method)(api)?,
            fn_name: (self.fn_name)(api)?,
            fn_comment: (self.fn_comment)(api)?,
            params: (self.params)(api)?,
            query: (self.query)(api)?,
            cookie: (self.cookie)(api)?,
            header: (self.header)(api)?,
            body: (self.body)(api)?,
            response: (self.response)(api)?,
        })
    }
}

/// Resolves every Api in order, stopping at the first failure.
pub fn resolve_apis(
    apis: &[Api],
    resolver: &Resolver,
) -> Result<Vec<ResolvedApi>, GenerationError> {
    apis.iter()
        .map(|api| {
            resolver.resolve(api).map_err(|e| GenerationError::Resolve {
                method: api.method.clone(),
                url: api.url.clone(),
                source: Box::new(e),
            })
        })
        .collect()
}

/// Block comment placed above the generated namespace and function.
///
/// Only the first line break of each text gets the ` * ` continuation;
/// generated output has always looked like this and consumers diff against it.
fn function_comment(description: Option<&str>, summary: Option<&str>) -> Option<String> {
    let description = description.filter(|d| !d.is_empty()).map(continue_first_line);
    let summary = summary.filter(|s| !s.is_empty()).map(continue_first_line);
    match (summary, description) {
        (None, None) => None,
        (Some(summary), Some(description)) => Some(format!(
            "\n        /**\n         * {summary}\n         *\n         * @description {description}\n         */\n"
        )),
        (Some(text), None) | (None, Some(text)) => {
            Some(format!("\n      /**\n       * {text}\n       */\n"))
        }
    }
}

fn continue_first_line(text: &str) -> String {
    text.replacen('\n', "\n* ", 1)
}
