use ethers::prelude::abigen;

abigen!(
    IConvertRouter,
    r#"[
        function sellPeggedToPool(address peggedToken, address synthToken, address tokenOut, uint256 amountIn, uint256 minOut, address receiver) external
        function sellPeggedToPoolToCurve(address peggedToken, address synthToken, address tokenInterim, address curvePool, int128 curveFromIndex, int128 curveToIndex, uint256 amountIn, uint256 minOut, address receiver) external
    ]"#
);
