use super::emitter::{PRICE_PLOT, write_header};
use super::options::CompilerOptions;
use crate::error::ValidationError;
use crate::script::ScriptWriter;

/// The script returned whenever compilation fails: the declaration header, the
/// errors as comments and a plain price plot. It is well-formed for any input.
pub fn fallback_script(options: &CompilerOptions, errors: &[ValidationError]) -> String {
    let mut writer = ScriptWriter::new();
    write_header(&mut writer, options);

    writer.banner("Generation Failed");
    writer.comment("The strategy graph could not be compiled:");
    for error in errors {
        writer.comment(&format!("ERROR: {}", error));
    }

    writer.blank();
    writer.line(PRICE_PLOT);
    writer.finish()
}
