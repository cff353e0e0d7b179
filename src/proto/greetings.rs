#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Greetings {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(enumeration = "Language", tag = "2")]
    pub language: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Language {
    English = 0,
    Spanish = 1,
    French = 2,
}

impl Language {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Language::English => "ENGLISH",
            Language::Spanish => "SPANISH",
            Language::French => "FRENCH",
        }
    }

    /// Salutation prefix used by the native greeter.
    pub fn salutation(&self) -> &'static str {
        match self {
            Language::English => "Hello",
            Language::Spanish => "Hola",
            Language::French => "Bonjour",
        }
    }
}
