//! Single-module transform API, plus the oxc passes shared with the plugin
//! host (`define` substitution, banner/footer).

use crate::diagnostics::Message;
use crate::loader::{self, Content, Loader};
use indexmap::IndexMap;
use oxc_allocator::Allocator;
use oxc_ast::ast::{Expression, IdentifierReference, ObjectProperty, StaticMemberExpression};
use oxc_ast_visit::{Visit, walk};
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use serde::Serialize;

/// Options for [`transform`].
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// Loader for the input (`Default` infers from `sourcefile`, else JS)
    pub loader: Loader,
    /// Name used for loader inference and diagnostics
    pub sourcefile: Option<String>,
    pub define: IndexMap<String, String>,
    pub banner: Option<String>,
    pub footer: Option<String>,
    pub minify_whitespace: bool,
}

impl TransformOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loader(mut self, loader: Loader) -> Self {
        self.loader = loader;
        self
    }

    pub fn sourcefile(mut self, name: impl Into<String>) -> Self {
        self.sourcefile = Some(name.into());
        self
    }

    pub fn define(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.define.insert(key.into(), value.into());
        self
    }

    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn minify_whitespace(mut self, enabled: bool) -> Self {
        self.minify_whitespace = enabled;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformResult {
    pub code: String,
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
}

/// Transform one module without resolving its imports.
///
/// ```
/// use kite_engine::{TransformOptions, transform};
///
/// let result = transform(
///     "if (DEBUG) log();",
///     &TransformOptions::new().define("DEBUG", "false"),
/// );
/// assert_eq!(result.code, "if (false) log();");
/// ```
pub fn transform(input: &str, options: &TransformOptions) -> TransformResult {
    let path = options.sourcefile.as_deref().unwrap_or("<stdin>");
    let loader = options.loader.or_infer(path);
    let mut result = TransformResult::default();

    if loader.needs_lowering() {
        result.warnings.push(lowering_warning(loader, path));
    }

    let code = match loader::apply(loader, path, input.as_bytes().to_vec()) {
        Ok(Content::Script { code, loader }) if loader.is_script() => {
            match apply_define(&code, loader, &options.define) {
                Ok(code) if options.minify_whitespace => match print_minified(&code, loader) {
                    Ok(code) => code,
                    Err(errors) => {
                        result.errors = errors;
                        return result;
                    }
                },
                Ok(code) => code,
                Err(errors) => {
                    result.errors = errors;
                    return result;
                }
            }
        }
        Ok(Content::Script { code, .. }) if loader == Loader::Json => {
            format!("module.exports = {};", code.trim())
        }
        Ok(Content::Script { code, .. }) => code,
        Ok(Content::Css(code)) => code,
        Err(text) => {
            result.errors.push(Message::new(text));
            return result;
        }
    };
    result.code = with_banner(code, options.banner.as_deref(), options.footer.as_deref());
    tracing::debug!(
        path,
        %loader,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "transform complete"
    );
    result
}

pub(crate) fn lowering_warning(loader: Loader, path: &str) -> Message {
    Message::new(format!(
        "The \"{}\" loader does not lower syntax; \"{}\" is emitted unchanged",
        loader, path
    ))
}

fn source_type(loader: Loader) -> SourceType {
    match loader {
        Loader::Jsx => SourceType::jsx(),
        Loader::Ts => SourceType::ts(),
        Loader::Tsx => SourceType::tsx(),
        _ => SourceType::mjs(),
    }
}

fn parse_errors(errors: impl IntoIterator<Item = impl std::fmt::Display>) -> Vec<Message> {
    errors
        .into_iter()
        .map(|e| Message::new(e.to_string()))
        .collect()
}

/// Replace identifiers and member chains (`process.env.NODE_ENV`) named in
/// `define` with their values. Strings, comments, and property names are
/// left alone; shorthand properties keep their key.
pub(crate) fn apply_define(
    source: &str,
    loader: Loader,
    define: &IndexMap<String, String>,
) -> Result<String, Vec<Message>> {
    if define.is_empty() {
        return Ok(source.to_string());
    }
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type(loader)).parse();
    if !ret.errors.is_empty() {
        return Err(parse_errors(ret.errors));
    }

    let mut collector = DefineCollector {
        define,
        edits: Vec::new(),
    };
    collector.visit_program(&ret.program);

    let mut edits = collector.edits;
    edits.sort_by_key(|(start, _, _)| *start);
    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for (start, end, text) in edits {
        if start < last {
            continue;
        }
        out.push_str(&source[last..start]);
        out.push_str(&text);
        last = end;
    }
    out.push_str(&source[last..]);
    Ok(out)
}

/// Print `source` through oxc's minifying code generator.
fn print_minified(source: &str, loader: Loader) -> Result<String, Vec<Message>> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type(loader)).parse();
    if !ret.errors.is_empty() {
        return Err(parse_errors(ret.errors));
    }
    Ok(Codegen::new()
        .with_options(CodegenOptions::minify())
        .build(&ret.program)
        .code)
}

/// Span edits for every `define` match in a program.
struct DefineCollector<'d> {
    define: &'d IndexMap<String, String>,
    edits: Vec<(usize, usize, String)>,
}

impl DefineCollector<'_> {
    fn replacement(&self, key: &str) -> Option<String> {
        self.define.get(key).cloned()
    }
}

/// `a.b.c` for a chain of identifiers and static member accesses.
fn member_chain(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::Identifier(ident) => Some(ident.name.to_string()),
        Expression::StaticMemberExpression(member) => member_chain(&member.object)
            .map(|object| format!("{}.{}", object, member.property.name)),
        _ => None,
    }
}

impl<'a> Visit<'a> for DefineCollector<'_> {
    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        if let Some(value) = self.replacement(&it.name) {
            self.edits
                .push((it.span.start as usize, it.span.end as usize, value));
        }
    }

    fn visit_static_member_expression(&mut self, it: &StaticMemberExpression<'a>) {
        let chain = member_chain(&it.object).map(|object| format!("{}.{}", object, it.property.name));
        match chain.and_then(|chain| self.replacement(&chain)) {
            Some(value) => self
                .edits
                .push((it.span.start as usize, it.span.end as usize, value)),
            None => walk::walk_static_member_expression(self, it),
        }
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        if it.shorthand {
            if let Expression::Identifier(ident) = &it.value {
                if let Some(value) = self.replacement(&ident.name) {
                    self.edits.push((
                        it.span.start as usize,
                        it.span.end as usize,
                        format!("{}: {}", ident.name, value),
                    ));
                    return;
                }
            }
        }
        walk::walk_object_property(self, it);
    }
}

pub(crate) fn with_banner(code: String, banner: Option<&str>, footer: Option<&str>) -> String {
    let mut out = String::with_capacity(code.len());
    if let Some(banner) = banner.filter(|b| !b.is_empty()) {
        out.push_str(banner);
        out.push('\n');
    }
    out.push_str(&code);
    if let Some(footer) = footer.filter(|f| !f.is_empty()) {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(footer);
        out.push('\n');
    }
    out
}
