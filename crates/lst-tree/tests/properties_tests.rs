use lst_tree::lang::properties_parser::PropertiesParser;
use lst_tree::{
    Cursor, ExecutionContext, MarkerPrinter, NoopVisitor, Parser, ParserRegistry, PrinterRegistry,
    TreeKind, TreeVisitor,
};
use proptest::prelude::*;
use std::path::Path;

fn line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z.]{1,8}[ \t]{0,2}[=:][ \t]{0,2}[a-zA-Z0-9 ]{0,10}",
        "[a-z]{1,6} [a-z]{1,6}",
        "[#!][ a-z]{0,12}",
        "[ \t]{0,3}",
        "[a-z]{1,4}=[a-z]{0,4}\\\\\n[ ]{0,4}[a-z]{1,4}",
    ]
}

fn document() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(line(), 0..12),
        prop_oneof![Just("\n"), Just("\r\n")],
        prop::bool::ANY,
    )
        .prop_map(|(lines, newline, trailing)| {
            let mut text = lines.join(newline);
            if trailing {
                text.push_str(newline);
            }
            text
        })
}

proptest! {
    #[test]
    fn prop_parse_print_round_trip(text in document()) {
        let source = PropertiesParser.parse(Path::new("gen.properties"), &text);
        prop_assert_eq!(source.kind(), TreeKind::PropertiesFile);
        let printed = PrinterRegistry::with_defaults().print_source(&source).unwrap();
        prop_assert_eq!(printed, text);
    }

    #[test]
    fn prop_noop_visit_preserves_identity(text in document()) {
        let source = ParserRegistry::with_defaults().parse(Path::new("gen.properties"), &text);
        let ctx = ExecutionContext::new();
        let after = NoopVisitor.visit(source.tree().clone(), &ctx, &Cursor::root()).unwrap();
        prop_assert!(after.unwrap().ptr_eq(source.tree()));
    }

    #[test]
    fn prop_unparseable_text_still_prints(text in "[=:][a-z=\n]{0,20}") {
        let source = ParserRegistry::with_defaults().parse(Path::new("bad.properties"), &text);
        prop_assert_eq!(source.kind(), TreeKind::ParseError);
        let printed = PrinterRegistry::with_defaults()
            .print(source.tree(), MarkerPrinter::Default)
            .unwrap();
        prop_assert_eq!(printed, text);
    }
}
