//! Definition of errors returned by this crate
//!
//! [`CodesError`] covers everything that can go wrong while talking to ecCodes,
//! [`Error`] covers the grid rewriting and station extraction pipelines.

use std::path::PathBuf;

use errno::Errno;
use thiserror::Error;

/// Errors returned by the ecCodes access layer.
#[derive(Error, Debug)]
pub enum CodesError {
    /// Returned when ecCodes function returns a known non-zero code.
    #[error("ecCodes function returned a non-zero code {0}")]
    Internal(#[from] CodesInternal),

    /// Returned when ecCodes function returns a code this crate does not know about.
    #[error("ecCodes function returned an unknown non-zero code {0}")]
    UnknownInternal(i32),

    /// Returned when one of libc functions returns a non-zero error code.
    /// Check libc documentation for details of the errors.
    #[error("libc function returned a non-zero code {0} ({1})")]
    LibcNonZero(i32, Errno),

    /// Returned when there is an issue while handling the file.
    #[error("Error occured while handling the file: {0}")]
    FileHandlingInterrupted(#[from] std::io::Error),

    /// Returned when a key name or value passed to ecCodes contains a nul byte.
    #[error("String passed to ecCodes contains a nul byte: {0}")]
    NulChar(#[from] std::ffi::NulError),

    /// Returned when the string returned by ecCodes is not nul-terminated.
    #[error("String returned by ecCodes is not nul-terminated: {0}")]
    NotNulTerminated(#[from] std::ffi::FromBytesWithNulError),

    /// Returned when the string returned by ecCodes is not a valid UTF-8.
    #[error("String returned by ecCodes is not a valid UTF-8: {0}")]
    CstrUTF8(#[from] std::str::Utf8Error),

    /// Returned when ecCodes reports an empty key.
    #[error("Key {0} has size lower than 1, the file is probably corrupted")]
    IncorrectKeySize(String),

    /// Returned when a null pointer is encountered where ecCodes expects a valid one.
    #[error("Null pointer encountered")]
    NullPtr,

    /// Returned when ecCodes cannot clone a message handle.
    #[error("ecCodes failed to clone the message")]
    CloneFailed,

    /// Returned when ecCodes cannot create a message from the named sample.
    #[error("ecCodes has no sample named {0}")]
    MissingSample(String),

    /// Returned when the grid of the message cannot be represented as a 2D array.
    #[error("Grid of the message cannot be converted to ndarray: {0}")]
    NdarrayShape(#[from] ndarray::ShapeError),

    /// Returned when the number of values does not agree with `Ni` and `Nj`.
    #[error("Message has {0} values, but its grid has {1} points")]
    UnexpectedValuesLength(usize, usize),

    /// Returned when a key has a value this crate cannot interpret.
    #[error("Key {0} has an unexpected value")]
    UnexpectedKeyValue(String),

    /// Returned when an integer key cannot be converted to an index.
    #[error("Key value does not fit into usize: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),
}

/// Errors returned by the grid rewriting and station extraction pipelines.
#[derive(Error, Debug)]
pub enum Error {
    /// ecCodes failed while reading or writing a message
    #[error(transparent)]
    Codes(#[from] CodesError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown forecast variable code
    #[error("Unknown forecast variable {0}, expected one of TMP, TMAX, TMIN, R01, RAT, SMG")]
    UnknownVariable(String),

    /// Local data array has a dimensionality other than 2 or 3
    #[error("Local data must be 2D (lat, lon) or 3D (step, lat, lon), got {0} dimensions")]
    Dimensionality(usize),

    /// Local data does not match the grid spanned by the extent
    #[error("Grid points along latitude and longitude ({expected_lat}, {expected_lon}) do not match data ({lat}, {lon})")]
    ShapeMismatch {
        expected_lat: usize,
        expected_lon: usize,
        lat: usize,
        lon: usize,
    },

    /// Local data has a step count other than the variable requires
    #[error("Data has {actual} forecast steps, {variable} requires {expected}")]
    StepCount {
        variable: String,
        expected: usize,
        actual: usize,
    },

    /// Raw data file does not hold a whole number of (lat, lon) planes
    #[error("Data file {path:?} holds {values} values, which is not a multiple of the {plane} grid points")]
    RawDataLength {
        path: PathBuf,
        values: usize,
        plane: usize,
    },

    /// Custom forecast time labels do not cover every step
    #[error("{labels} forecast time labels given for {steps} steps")]
    ForecastLabels { labels: usize, steps: usize },

    /// Issue time string is not `YYYYmmddHHMM`
    #[error("Invalid issue time {0:?}, expected YYYYmmddHHMM")]
    IssueTime(String),

    /// No template file found in the sample directory
    #[error("No template matching {pattern} found in {dir:?}")]
    TemplateNotFound { dir: PathBuf, pattern: String },

    /// No grid file found in the source directory
    #[error("No grid file matching {pattern} found in {dir:?}")]
    GridFileNotFound { dir: PathBuf, pattern: String },

    /// Template file holds no messages
    #[error("Template {0:?} contains no GRIB messages")]
    EmptyTemplate(PathBuf),

    /// Template parameter name differs from the expected one
    #[error("Template parameter is {found:?}, expected {expected:?}")]
    NameMismatch { expected: String, found: String },

    /// Template has no message for the requested forecast time
    #[error("Template has no message with forecastTime {0}")]
    MissingForecastTime(i64),

    /// Local grid does not line up with the template grid
    #[error("Template region selects {rows}x{cols} points, local grid is {lat}x{lon}")]
    RegionMismatch {
        rows: usize,
        cols: usize,
        lat: usize,
        lon: usize,
    },

    /// Unknown region code
    #[error("Unknown region {0}")]
    UnknownRegion(String),

    /// Grid file has too few messages for a bulletin
    #[error("Grid file {path:?} has {found} messages, bulletin requires {required}")]
    TooFewSteps {
        path: PathBuf,
        found: usize,
        required: usize,
    },

    /// Presence flags do not cover every flagged hour and station
    #[error("{product} flags are {rows}x{cols}, bulletin needs {required_rows} hours for {stations} stations")]
    FlagShape {
        product: String,
        rows: usize,
        cols: usize,
        required_rows: usize,
        stations: usize,
    },

    /// Station table cannot be read
    #[error("Station table error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON config cannot be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Convenience type alias for pipeline results
pub type Result<T> = std::result::Result<T, Error>;

/// Errors defined in ecCodes, mapped from the codes returned by its functions.
///
/// Codes this enum does not list are reported as [`CodesError::UnknownInternal`].
#[derive(Copy, Eq, PartialEq, Clone, Ord, PartialOrd, Hash, Error, Debug, num_derive::FromPrimitive)]
pub enum CodesInternal {
    ///End of resource
    #[error("End of resource")]
    CodesEndOfFile = -1,
    ///Internal error
    #[error("Internal error")]
    CodesInternalError = -2,
    ///Passed buffer is too small
    #[error("Passed buffer is too small")]
    CodesBufferTooSmall = -3,
    ///Function not yet implemented
    #[error("Function not yet implemented")]
    CodesNotImplemented = -4,
    ///Missing 7777 at end of message
    #[error("Missing 7777 at end of message")]
    Codes7777NotFound = -5,
    ///Passed array is too small
    #[error("Passed array is too small")]
    CodesArrayTooSmall = -6,
    ///File not found
    #[error("File not found")]
    CodesFileNotFound = -7,
    ///Code not found in code table
    #[error("Code not found in code table")]
    CodesCodeNotFoundInTable = -8,
    ///Array size mismatch
    #[error("Array size mismatch")]
    CodesWrongArraySize = -9,
    ///Key/value not found
    #[error("Key/value not found")]
    CodesNotFound = -10,
    ///Input output problem
    #[error("Input output problem")]
    CodesIoProblem = -11,
    ///Message invalid
    #[error("Message invalid")]
    CodesInvalidMessage = -12,
    ///Decoding invalid
    #[error("Decoding invalid")]
    CodesDecodingError = -13,
    ///Encoding invalid
    #[error("Encoding invalid")]
    CodesEncodingError = -14,
    ///Code cannot unpack because of string too small
    #[error("Code cannot unpack because of string too small")]
    CodesNoMoreInSet = -15,
    ///Problem with calculation of geographic attributes
    #[error("Problem with calculation of geographic attributes")]
    CodesGeocalculusProblem = -16,
    ///Memory allocation error
    #[error("Memory allocation error")]
    CodesOutOfMemory = -17,
    ///Value is read only
    #[error("Value is read only")]
    CodesReadOnly = -18,
    ///Invalid argument
    #[error("Invalid argument")]
    CodesInvalidArgument = -19,
    ///Null handle
    #[error("Null handle")]
    CodesNullHandle = -20,
    ///Invalid section number
    #[error("Invalid section number")]
    CodesInvalidSectionNumber = -21,
    ///Value cannot be missing
    #[error("Value cannot be missing")]
    CodesValueCannotBeMissing = -22,
    ///Wrong message length
    #[error("Wrong message length")]
    CodesWrongLength = -23,
    ///Invalid key type
    #[error("Invalid key type")]
    CodesInvalidType = -24,
    ///Unable to set step
    #[error("Unable to set step")]
    CodesWrongStep = -25,
    ///Wrong units for step (step must be integer)
    #[error("Wrong units for step (step must be integer)")]
    CodesWrongStepUnit = -26,
    ///Invalid file id
    #[error("Invalid file id")]
    CodesInvalidFile = -27,
    ///Invalid grib id
    #[error("Invalid grib id")]
    CodesInvalidGrib = -28,
    ///Invalid index id
    #[error("Invalid index id")]
    CodesInvalidIndex = -29,
    ///Invalid iterator id
    #[error("Invalid iterator id")]
    CodesInvalidIterator = -30,
    ///Invalid keys iterator id
    #[error("Invalid keys iterator id")]
    CodesInvalidKeysIterator = -31,
    ///Invalid nearest id
    #[error("Invalid nearest id")]
    CodesInvalidNearest = -32,
    ///Invalid order by
    #[error("Invalid order by")]
    CodesInvalidOrderBy = -33,
    ///Missing a key from the fieldset
    #[error("Missing a key from the fieldset")]
    CodesMissingKey = -34,
    ///The point is out of the grid area
    #[error("The point is out of the grid area")]
    CodesOutOfArea = -35,
    ///Concept no match
    #[error("Concept no match")]
    CodesConceptNoMatch = -36,
    ///Hash array no match
    #[error("Hash array no match")]
    CodesHashArrayNoMatch = -37,
    ///Definitions files not found
    #[error("Definitions files not found")]
    CodesNoDefinitions = -38,
    ///Wrong type while packing
    #[error("Wrong type while packing")]
    CodesWrongType = -39,
    ///End of resource
    #[error("End of resource")]
    CodesEnd = -40,
    ///Unable to code a field without values
    #[error("Unable to code a field without values")]
    CodesNoValues = -41,
    ///Grid description is wrong or inconsistent
    #[error("Grid description is wrong or inconsistent")]
    CodesWrongGrid = -42,
    ///End of index reached
    #[error("End of index reached")]
    CodesEndOfIndex = -43,
    ///Null index
    #[error("Null index")]
    CodesNullIndex = -44,
    ///End of resource reached when reading message
    #[error("End of resource reached when reading message")]
    CodesPrematureEndOfFile = -45,
}

#[cfg(test)]
mod tests {
    use num_traits::FromPrimitive;

    use super::*;

    #[test]
    fn internal_codes_map_to_variants() {
        let err: Option<CodesInternal> = FromPrimitive::from_i32(-10);
        assert_eq!(err, Some(CodesInternal::CodesNotFound));

        let err: Option<CodesInternal> = FromPrimitive::from_i32(-18);
        assert_eq!(err, Some(CodesInternal::CodesReadOnly));

        let err: Option<CodesInternal> = FromPrimitive::from_i32(-1000);
        assert_eq!(err, None);
    }

    #[test]
    fn shape_mismatch_names_both_shapes() {
        let err = Error::ShapeMismatch {
            expected_lat: 201,
            expected_lon: 201,
            lat: 200,
            lon: 201,
        };

        assert_eq!(
            err.to_string(),
            "Grid points along latitude and longitude (201, 201) do not match data (200, 201)"
        );
    }
}
