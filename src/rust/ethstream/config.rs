// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::{
    fail::Fail,
    network::{
        config::Delimiting,
        consts::DEFAULT_MTU,
    },
};
use ::libc::{
    EINVAL,
    ERANGE,
};
use ::std::{
    fs::File,
    io::Read,
    ops::Index,
    path::Path,
    str::FromStr,
};
use ::yaml_rust::{
    Yaml,
    YamlLoader,
};

//======================================================================================================================
// Constants
//======================================================================================================================

// Codec options. These apply to both the encoder and the decoder.
mod codec_config {
    pub const SECTION_NAME: &str = "ethstream";
    // Largest payload, in bytes.
    pub const MTU: &str = "mtu";
    // Receiver wire contract: "end_of_stream", "length_field" or "fixed".
    pub const RX_DELIMITING: &str = "rx_delimiting";
    // Payload length of every frame when the receiver uses "fixed" delimiting.
    pub const RX_PAYLOAD_LENGTH: &str = "rx_payload_length";
    // Whether the received stream still carries preamble and SFD.
    pub const RX_STRIP_PREAMBLE: &str = "rx_strip_preamble";
    // Whether short frames are zero-padded before transmission.
    pub const TX_PAD_SHORT_FRAMES: &str = "tx_pad_short_frames";
}

//======================================================================================================================
// Structures
//======================================================================================================================

/// Codec configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Yaml);

//======================================================================================================================
// Associated Functions
//======================================================================================================================

/// Common associated functions for codec configuration object.
impl Config {
    /// Reads a configuration file into a [Config] object.
    pub fn new<P: AsRef<Path>>(config_path: P) -> Result<Self, Fail> {
        let mut config_s: String = String::new();
        File::open(config_path.as_ref())?.read_to_string(&mut config_s)?;
        debug!("new(): loaded configuration (path={:?})", config_path.as_ref());
        config_s.parse()
    }

    fn get_codec_config(&self) -> Result<&Yaml, Fail> {
        Self::get_subsection(&self.0, codec_config::SECTION_NAME)
    }

    /// Reads the "MTU" parameter from the environment variable first and then the underlying configuration file.
    /// Defaults to the standard Ethernet MTU.
    pub fn mtu(&self) -> Result<usize, Fail> {
        if let Some(mtu) = Self::get_typed_env_option(codec_config::MTU)? {
            return Ok(mtu);
        }
        match Self::get_optional(self.get_codec_config()?, codec_config::MTU) {
            Some(_) => Self::get_int_option(self.get_codec_config()?, codec_config::MTU),
            None => Ok(DEFAULT_MTU),
        }
    }

    /// Reads the receiver delimiting mode. A "fixed" mode additionally requires the "rx_payload_length" option.
    pub fn rx_delimiting(&self) -> Result<Delimiting, Fail> {
        let section: &Yaml = self.get_codec_config()?;
        let delimiting: Delimiting = if let Some(mode) = Self::get_typed_env_option(codec_config::RX_DELIMITING)? {
            mode
        } else if Self::get_optional(section, codec_config::RX_DELIMITING).is_some() {
            Self::get_typed_str_option(section, codec_config::RX_DELIMITING, |val: &str| val.parse().ok())?
        } else {
            Delimiting::EndOfStream
        };

        match delimiting {
            Delimiting::Fixed(_) => {
                let len: usize = if let Some(len) = Self::get_typed_env_option(codec_config::RX_PAYLOAD_LENGTH)? {
                    len
                } else {
                    Self::get_int_option(section, codec_config::RX_PAYLOAD_LENGTH)?
                };
                Ok(Delimiting::Fixed(len))
            },
            mode => Ok(mode),
        }
    }

    /// Reads whether the received stream still carries preamble and SFD. Defaults to false.
    pub fn rx_strip_preamble(&self) -> Result<bool, Fail> {
        self.get_flag(codec_config::RX_STRIP_PREAMBLE)
    }

    /// Reads whether short frames are padded before transmission. Defaults to false.
    pub fn tx_pad_short_frames(&self) -> Result<bool, Fail> {
        self.get_flag(codec_config::TX_PAD_SHORT_FRAMES)
    }

    fn get_flag(&self, index: &str) -> Result<bool, Fail> {
        if let Some(flag) = Self::get_typed_env_option(index)? {
            return Ok(flag);
        }
        let section: &Yaml = self.get_codec_config()?;
        match Self::get_optional(section, index) {
            Some(_) => Self::get_bool_option(section, index),
            None => Ok(false),
        }
    }

    //======================================================================================================================
    // Static Functions
    //======================================================================================================================

    /// Returns a `&Yaml` subsection, validating that it exists and is a hash.
    fn get_subsection<'a>(yaml: &'a Yaml, index: &str) -> Result<&'a Yaml, Fail> {
        let section: &'a Yaml = Self::get_option(yaml, index)?;
        match section {
            Yaml::Hash(_) => Ok(section),
            _ => {
                let message: String = format!("parameter \"{}\" has unexpected type", index);
                Err(Fail::new(EINVAL, message.as_str()))
            },
        }
    }

    /// Index `yaml` to find the value at `index`, validating that the index exists.
    fn get_option<'a>(yaml: &'a Yaml, index: &str) -> Result<&'a Yaml, Fail> {
        match Self::get_optional(yaml, index) {
            Some(value) => Ok(value),
            None => {
                let message: String = format!("missing configuration option \"{}\"", index);
                Err(Fail::new(EINVAL, message.as_str()))
            },
        }
    }

    /// Index `yaml` to find the value at `index`, if any.
    fn get_optional<'a>(yaml: &'a Yaml, index: &str) -> Option<&'a Yaml> {
        match yaml.index(index) {
            Yaml::BadValue => None,
            value => Some(value),
        }
    }

    /// Index `yaml` to find the value at `index`, validating that it exists and that the receiver returns Some(_).
    fn get_typed_option<'a, T, Fn>(yaml: &'a Yaml, index: &str, receiver: Fn) -> Result<T, Fail>
    where
        Fn: FnOnce(&'a Yaml) -> Option<T>,
    {
        let option: &'a Yaml = Self::get_option(yaml, index)?;
        match receiver(option) {
            Some(value) => Ok(value),
            None => {
                let message: String = format!("parameter {} has unexpected type", index);
                Err(Fail::new(EINVAL, message.as_str()))
            },
        }
    }

    /// Index `yaml` to find value at `index`, validating it as a string.
    fn get_typed_str_option<T, Fn>(yaml: &Yaml, index: &str, parser: Fn) -> Result<T, Fail>
    where
        Fn: FnOnce(&str) -> Option<T>,
    {
        let option: &Yaml = Self::get_option(yaml, index)?;
        if let Some(value) = option.as_str() {
            if let Some(value) = parser(value) {
                return Ok(value);
            }
        }
        let message: String = format!("parameter {} has unexpected value", index);
        Err(Fail::new(EINVAL, message.as_str()))
    }

    /// Get value where the environment value overrides the config file if it exists.
    fn get_typed_env_option<T: FromStr>(index: &str) -> Result<Option<T>, Fail> {
        if let Ok(var) = ::std::env::var(index.to_uppercase()) {
            if let Ok(value) = var.as_str().parse() {
                return Ok(Some(value));
            } else {
                let message: String = format!("parameter {} has unexpected type", index);
                return Err(Fail::new(EINVAL, message.as_str()));
            }
        }
        Ok(None)
    }

    /// Similar to `get_typed_option` using `Yaml::as_i64` as the receiver, but additionally verifies that the
    /// destination type may hold the i64 value.
    fn get_int_option<T: TryFrom<i64>>(yaml: &Yaml, index: &str) -> Result<T, Fail> {
        let val: i64 = Self::get_typed_option(yaml, index, &Yaml::as_i64)?;
        match T::try_from(val) {
            Ok(val) => Ok(val),
            _ => {
                let message: String = format!("parameter \"{}\" is out of range", index);
                Err(Fail::new(ERANGE, message.as_str()))
            },
        }
    }

    /// Same as `Self::get_typed_option` using `Yaml::as_bool` as the receiver.
    fn get_bool_option(yaml: &Yaml, index: &str) -> Result<bool, Fail> {
        Self::get_typed_option(yaml, index, &Yaml::as_bool)
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

/// Parses a YAML document holding exactly one configuration object.
impl FromStr for Config {
    type Err = Fail;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Vec<Yaml> = YamlLoader::load_from_str(s)?;
        let config_obj: &Yaml = match &config[..] {
            [c] => c,
            _ => return Err(Fail::new(EINVAL, "Wrong number of config objects")),
        };
        Ok(Self(config_obj.clone()))
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
