use anyhow::{Context, Result};
use swc_common::{sync::Lrc, BytePos, FileName, SourceMap, Span};
use swc_ecma_ast::Module;
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax, TsSyntax};

/// A parsed module together with the file's span origin, so AST spans can
/// be mapped back to byte offsets in the original text.
pub struct ParsedModule {
    pub module: Module,
    start_pos: BytePos,
}

impl ParsedModule {
    /// Converts an AST span to a `[lo, hi)` byte range in the source text.
    pub fn byte_range(&self, span: Span) -> (usize, usize) {
        (
            (span.lo.0 - self.start_pos.0) as usize,
            (span.hi.0 - self.start_pos.0) as usize,
        )
    }
}

pub struct TypeScriptParser {
    pub source_map: Lrc<SourceMap>,
}

impl Default for TypeScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeScriptParser {
    pub fn new() -> Self {
        Self {
            source_map: Lrc::new(SourceMap::default()),
        }
    }

    pub fn parse(&self, source: &str, filename: &str) -> Result<ParsedModule> {
        let fm = self.source_map.new_source_file(
            Lrc::new(FileName::Custom(filename.to_string())),
            source.to_string(),
        );

        let syntax = Syntax::Typescript(TsSyntax {
            tsx: filename.ends_with(".tsx") || filename.ends_with(".jsx"),
            decorators: true,
            no_early_errors: true,
            ..Default::default()
        });

        let lexer = Lexer::new(syntax, Default::default(), StringInput::from(&*fm), None);
        let mut parser = Parser::new_from(lexer);

        let module = parser
            .parse_module()
            .map_err(|err| anyhow::anyhow!("Failed to parse {}: {:?}", filename, err))
            .context("Failed to parse TypeScript module")?;

        Ok(ParsedModule {
            module,
            start_pos: fm.start_pos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_common::Spanned;
    use swc_ecma_ast::*;

    #[test]
    fn test_parse_empty_file() {
        let parser = TypeScriptParser::new();
        let parsed = parser.parse("", "test.ts").unwrap();
        assert_eq!(parsed.module.body.len(), 0);
    }

    #[test]
    fn test_parse_imports_and_exports() {
        let parser = TypeScriptParser::new();
        let source = "import { foo } from './bar';\nexport { foo };\n";
        let parsed = parser.parse(source, "test.ts").unwrap();
        assert_eq!(parsed.module.body.len(), 2);

        match &parsed.module.body[0] {
            ModuleItem::ModuleDecl(ModuleDecl::Import(_)) => {}
            other => panic!("Expected import declaration, got {other:?}"),
        }
        match &parsed.module.body[1] {
            ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(_)) => {}
            other => panic!("Expected named export, got {other:?}"),
        }
    }

    #[test]
    fn test_byte_range_maps_spans_to_source_offsets() {
        let parser = TypeScriptParser::new();
        let source = "const x = 1;\nimport a from 'a';";
        let parsed = parser.parse(source, "test.ts").unwrap();
        let (lo, hi) = parsed.byte_range(parsed.module.body[1].span());
        assert_eq!(&source[lo..hi], "import a from 'a';");
    }

    #[test]
    fn test_parse_tsx_file() {
        let parser = TypeScriptParser::new();
        let source = "import React from 'react';\nexport const X = () => <div />;\n";
        assert!(parser.parse(source, "test.tsx").is_ok());
    }

    #[test]
    fn test_parse_syntax_error() {
        let parser = TypeScriptParser::new();
        let result = parser.parse("import { foo from './bar';", "test.ts");
        assert!(result.is_err());
    }
}
