pub mod attributes;
pub mod functions;
pub mod navigation;
pub mod properties;


use anyhow::Result;
use xule_core::vocab::Vocabulary;

/// Register all built-in vocabulary modules with `vocab`.
pub fn register_stdlib(vocab: &mut Vocabulary) -> Result<()> {
    vocab.register_module(&functions::FunctionsModule::new())?;
    vocab.register_module(&properties::PropertiesModule::new())?;
    vocab.register_module(&navigation::NavigationModule::new())?;
    vocab.register_module(&attributes::AttributesModule::new())?;
    Ok(())
}

/// A fresh vocabulary holding every built-in name.
pub fn standard_vocabulary() -> Result<Vocabulary> {
    let mut vocab = Vocabulary::new();
    register_stdlib(&mut vocab)?;
    Ok(vocab)
}
