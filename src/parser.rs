use crate::builtin::{Arity, BuiltinTable, parse_offset};
use crate::command::{BuiltinKind, CommandClassification, InvalidReason};
use crate::lexer::ArgumentVector;

/// Decide what an argument vector asks for.
///
/// Builtins are matched on `args[0]` against `table`, including the compact `!N`
/// recall form. A builtin that declares one argument must have `args[1]`; extra
/// parameters are ignored. Anything not in the table is [`CommandClassification::External`].
///
/// Total over its input: every vector maps to exactly one classification.
pub fn classify(args: &ArgumentVector, table: &BuiltinTable) -> CommandClassification {
    let Some(name) = args.program() else {
        return CommandClassification::Empty;
    };

    if let Some(spec) = table.lookup(name) {
        let arg = match spec.arity {
            Arity::None => None,
            Arity::One => match args.get(1) {
                Some(arg) => Some(arg),
                None => return CommandClassification::Invalid(InvalidReason::MissingArgument),
            },
        };
        return match spec.resolve(arg) {
            Ok(kind) => CommandClassification::Builtin(kind),
            Err(reason) => CommandClassification::Invalid(reason),
        };
    }

    if let Some(offset) = table.compact_recall(name) {
        return match parse_offset(offset) {
            Ok(n) => CommandClassification::Builtin(BuiltinKind::RecallAt(n)),
            Err(reason) => CommandClassification::Invalid(reason),
        };
    }

    CommandClassification::External
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::normalize::normalize;

    fn classify_str(s: &str) -> CommandClassification {
        let args = match normalize(s.to_string()) {
            Some(line) => tokenize(Some(&line)).unwrap(),
            None => ArgumentVector::new(),
        };
        classify(&args, &BuiltinTable::default())
    }

    #[test]
    fn empty_vector() {
        assert_eq!(classify_str(""), CommandClassification::Empty);
    }

    #[test]
    fn builtins_without_arguments() {
        assert_eq!(
            classify_str("exit"),
            CommandClassification::Builtin(BuiltinKind::Exit)
        );
        assert_eq!(
            classify_str("history"),
            CommandClassification::Builtin(BuiltinKind::ShowHistory)
        );
        assert_eq!(
            classify_str("!!"),
            CommandClassification::Builtin(BuiltinKind::RecallLast)
        );
        // extra parameters are ignored
        assert_eq!(
            classify_str("exit now"),
            CommandClassification::Builtin(BuiltinKind::Exit)
        );
    }

    #[test]
    fn recall_at_requires_a_positive_number() {
        assert_eq!(
            classify_str("! 3"),
            CommandClassification::Builtin(BuiltinKind::RecallAt(3))
        );
        assert_eq!(
            classify_str("!"),
            CommandClassification::Invalid(InvalidReason::MissingArgument)
        );
        assert_eq!(
            classify_str("! x"),
            CommandClassification::Invalid(InvalidReason::InvalidOffset)
        );
        assert_eq!(
            classify_str("! 0"),
            CommandClassification::Invalid(InvalidReason::InvalidOffset)
        );
        assert_eq!(
            classify_str("! -1"),
            CommandClassification::Invalid(InvalidReason::InvalidOffset)
        );
    }

    #[test]
    fn compact_recall_form() {
        assert_eq!(
            classify_str("!3"),
            CommandClassification::Builtin(BuiltinKind::RecallAt(3))
        );
        assert_eq!(
            classify_str("!0"),
            CommandClassification::Invalid(InvalidReason::InvalidOffset)
        );
        assert_eq!(classify_str("!vi"), CommandClassification::External);
    }

    #[test]
    fn everything_else_is_external() {
        assert_eq!(classify_str("ls -la"), CommandClassification::External);
        assert_eq!(classify_str("EXIT"), CommandClassification::External);
        assert_eq!(classify_str("sleep 5 &"), CommandClassification::External);
        assert_eq!(classify_str("&"), CommandClassification::External);
        assert_eq!(
            classify_str("/definitely/not/a/program"),
            CommandClassification::External
        );
    }

    #[test]
    fn classify_is_total() {
        let samples = [
            "", "!", "!!", "! !", "!!!", "! 99999999999999999999", "!-", "history history",
            "exit 1 2 3", "&", "& &", "! 1 2",
        ];
        for s in samples {
            // Must not panic and must produce one of the variants.
            let _ = classify_str(s);
        }
        assert_eq!(
            classify_str("! 99999999999999999999"),
            CommandClassification::Invalid(InvalidReason::InvalidOffset)
        );
    }
}
