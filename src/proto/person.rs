/// Construction parameters for a native person instance.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PersonParams {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(uint32, tag = "2")]
    pub age: u32,
}
